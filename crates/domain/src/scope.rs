//! Department and branch comparison rules.
//!
//! Departments compare case-insensitively; branches compare exactly.
//! Wildcard helpers treat an unset value on the *entity* side as "no
//! restriction"; strict helpers require both sides to be set.

use crate::Role;

/// Trims a scoping value and maps blank strings to `None`.
#[must_use]
pub fn normalize_scope_value(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

/// Returns true when a scoping value is absent or blank.
#[must_use]
pub fn scope_value_is_unset(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

/// Entity department is unset or equals the actor's, ignoring case.
#[must_use]
pub fn department_allows(entity_department: Option<&str>, actor_department: &str) -> bool {
    match entity_department {
        Some(department) if !department.trim().is_empty() => {
            department_equals(department, actor_department)
        }
        _ => true,
    }
}

/// Entity branch is unset or equals the actor's exactly.
#[must_use]
pub fn branch_allows(entity_branch: Option<&str>, actor_branch: &str) -> bool {
    match entity_branch {
        Some(branch) if !branch.trim().is_empty() => branch_equals(branch, actor_branch),
        _ => true,
    }
}

/// Audience is unset/empty or lists the role.
#[must_use]
pub fn audience_allows(audience: Option<&[Role]>, role: Role) -> bool {
    match audience {
        Some(roles) if !roles.is_empty() => roles.contains(&role),
        _ => true,
    }
}

/// Both departments are set and equal, ignoring case.
#[must_use]
pub fn same_department(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            department_equals(left, right)
        }
        _ => false,
    }
}

/// Both branches are set and equal exactly.
#[must_use]
pub fn same_branch(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            branch_equals(left, right)
        }
        _ => false,
    }
}

fn department_equals(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

fn branch_equals(left: &str, right: &str) -> bool {
    left.trim() == right.trim()
}
