/// Operations a caller may be granted. Handlers check exactly one action per
/// request instead of matching on the role inline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    ClockSelf,
    SubmitRegularization,
    ManageRecords,
    DecideRegularization,
    ViewAllRecords,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Manager = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Manager),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Capability table. Clocking and submitting corrections are open to any
    /// authenticated caller with an employee profile; record management and
    /// request decisions stay with admin/manager.
    pub fn allows(self, action: Action) -> bool {
        match action {
            Action::ClockSelf | Action::SubmitRegularization => true,
            Action::ManageRecords | Action::DecideRegularization | Action::ViewAllRecords => {
                matches!(self, Role::Admin | Role::Manager)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_id_is_rejected() {
        assert_eq!(Role::from_id(2), Some(Role::Manager));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn employee_cannot_manage_or_decide() {
        assert!(!Role::Employee.allows(Action::ManageRecords));
        assert!(!Role::Employee.allows(Action::DecideRegularization));
        assert!(!Role::Employee.allows(Action::ViewAllRecords));
        assert!(Role::Employee.allows(Action::ClockSelf));
        assert!(Role::Employee.allows(Action::SubmitRegularization));
    }

    #[test]
    fn admin_and_manager_hold_every_capability() {
        for role in [Role::Admin, Role::Manager] {
            for action in [
                Action::ClockSelf,
                Action::SubmitRegularization,
                Action::ManageRecords,
                Action::DecideRegularization,
                Action::ViewAllRecords,
            ] {
                assert!(role.allows(action));
            }
        }
    }
}
