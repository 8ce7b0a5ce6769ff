use alumnet_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::scope::normalize_scope_value;
use crate::{Role, UserId};

/// Identity attributes of the account making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: UserId,
    role: Role,
    department: Option<String>,
    branch: Option<String>,
}

impl Actor {
    /// Creates an actor, normalizing blank department/branch to unset.
    #[must_use]
    pub fn new(
        id: UserId,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
    ) -> Self {
        Self {
            id,
            role,
            department: normalize_scope_value(department),
            branch: normalize_scope_value(branch),
        }
    }

    /// Returns the account id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the account role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the department, if set.
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Returns the branch, if set.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Returns true for platform administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns the department of a scoped actor.
    ///
    /// Scoped roles without a department are refused instead of being
    /// granted wildcard access.
    pub fn require_department(&self) -> AppResult<&str> {
        self.department.as_deref().ok_or_else(|| {
            AppError::Forbidden(format!(
                "invalid scope: {} account '{}' has no department",
                self.role, self.id
            ))
        })
    }

    /// Returns whether the actor carries a department when its role needs
    /// one. A missing branch narrows visibility but never invalidates.
    #[must_use]
    pub fn has_valid_scope(&self) -> bool {
        !self.role.requires_department() || self.department.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_department_is_invalid_scope() {
        let actor = Actor::new(UserId::new(), Role::Student, Some("  ".to_owned()), None);
        assert!(!actor.has_valid_scope());
        assert!(matches!(
            actor.require_department(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn alumni_without_branch_keeps_valid_scope() {
        let actor = Actor::new(
            UserId::new(),
            Role::Alumni,
            Some("cmpica".to_owned()),
            Some(" ".to_owned()),
        );
        assert!(actor.has_valid_scope());
        assert_eq!(actor.branch(), None);
    }

    #[test]
    fn admin_needs_no_department() {
        let actor = Actor::new(UserId::new(), Role::Admin, None, None);
        assert!(actor.has_valid_scope());
        assert!(actor.is_admin());
    }
}
