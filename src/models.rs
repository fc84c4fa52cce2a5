use serde::{Deserialize, Serialize};

/// Bearer-token claims issued by the identity service. This module only
/// verifies and reads them; sessions are minted elsewhere.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<i64>,
}
