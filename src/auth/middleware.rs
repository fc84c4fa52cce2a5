use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": message }))
}

/// Resolve the caller from the bearer token, or produce the 401 to short-
/// circuit with.
fn authenticate(req: &ServiceRequest, jwt_secret: &str) -> Result<AuthUser, HttpResponse> {
    let header_value = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let token = header_value
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header encoding"))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Authorization header must start with Bearer"))?;

    let claims = verify_token(token, jwt_secret)
        .map_err(|details| unauthorized(&format!("Invalid or expired token: {details}")))?;

    let role = Role::from_id(claims.role).ok_or_else(|| unauthorized("Invalid role"))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    match authenticate(&req, &config.jwt_secret) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(resp) => Ok(req.into_response(resp.map_into_boxed_body())),
    }
}
