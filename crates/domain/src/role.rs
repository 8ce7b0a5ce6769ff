use std::str::FromStr;

use alumnet_core::AppError;
use serde::{Deserialize, Serialize};

/// Account roles, from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator, unrestricted.
    Admin,
    /// Administrator of a single college department.
    CollegeAdmin,
    /// Teaching staff scoped to a department.
    Professor,
    /// Enrolled student scoped to a department and branch.
    Student,
    /// Graduate scoped to a department and branch.
    Alumni,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::CollegeAdmin => "collegeadmin",
            Self::Professor => "professor",
            Self::Student => "student",
            Self::Alumni => "alumni",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Admin,
            Role::CollegeAdmin,
            Role::Professor,
            Role::Student,
            Role::Alumni,
        ];

        ALL
    }

    /// Every role except admin must carry a department.
    #[must_use]
    pub fn requires_department(&self) -> bool {
        !matches!(self, Self::Admin)
    }

    /// Students and alumni belong to a branch inside their department.
    #[must_use]
    pub fn requires_branch(&self) -> bool {
        self.is_audience_member()
    }

    /// Roles whose content visibility is gated by target audiences.
    #[must_use]
    pub fn is_audience_member(&self) -> bool {
        matches!(self, Self::Student | Self::Alumni)
    }

    /// Roles that may sign up through public registration.
    #[must_use]
    pub fn is_self_registrable(&self) -> bool {
        !matches!(self, Self::Admin)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "collegeadmin" => Ok(Self::CollegeAdmin),
            "professor" => Ok(Self::Professor),
            "student" => Ok(Self::Student),
            "alumni" => Ok(Self::Alumni),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
