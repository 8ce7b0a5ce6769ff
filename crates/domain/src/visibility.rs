//! Visibility and mutation rules for scoped records.

use alumnet_core::AppResult;

use crate::scope::same_department;
use crate::{Actor, ContentClass, ContentScope, PostVisibility, Role, ViewFilter};

/// Builds the predicate describing every record of `class` the actor may
/// see.
///
/// Scoped actors without a department are refused with `Forbidden` rather
/// than widened to a wildcard. Students and alumni without a branch only
/// match unbranched records on the branch dimension.
pub fn build_view_filter(actor: &Actor, class: ContentClass) -> AppResult<ViewFilter> {
    if actor.is_admin() {
        return Ok(ViewFilter::Unrestricted);
    }

    let department = ViewFilter::department(actor.require_department()?);

    if !actor.role().is_audience_member() {
        // Staff see their whole department regardless of branch.
        return Ok(match class {
            ContentClass::Post => ViewFilter::Any(vec![
                ViewFilter::visibility(Some(PostVisibility::Public)),
                department,
            ]),
            ContentClass::Event
            | ContentClass::Job
            | ContentClass::Meeting
            | ContentClass::UserListing => department,
        });
    }

    let branch = ViewFilter::branch_of(actor.branch());
    let audience = ViewFilter::audience(actor.role());

    Ok(match class {
        ContentClass::Event | ContentClass::Job | ContentClass::Meeting => {
            ViewFilter::All(vec![audience, department, branch])
        }
        ContentClass::Post => ViewFilter::Any(vec![
            ViewFilter::visibility(Some(PostVisibility::Public)),
            ViewFilter::All(vec![
                ViewFilter::visibility(Some(PostVisibility::Department)),
                audience.clone(),
                department.clone(),
            ]),
            ViewFilter::All(vec![
                ViewFilter::visibility(Some(PostVisibility::Branch)),
                audience.clone(),
                department.clone(),
                branch.clone(),
            ]),
            ViewFilter::All(vec![
                ViewFilter::visibility(None),
                audience,
                department,
                branch,
            ]),
        ]),
        ContentClass::UserListing => ViewFilter::All(vec![department, branch]),
    })
}

/// Returns whether the actor may see a record of `class` with `scope`.
#[must_use]
pub fn can_view(actor: &Actor, scope: &ContentScope, class: ContentClass) -> bool {
    build_view_filter(actor, class)
        .map(|filter| filter.matches(scope))
        .unwrap_or(false)
}

/// Returns whether the actor may edit or delete a record of `class`.
#[must_use]
pub fn can_mutate(actor: &Actor, scope: &ContentScope, class: ContentClass) -> bool {
    if !actor.has_valid_scope() {
        return false;
    }

    match actor.role() {
        Role::Admin => true,
        _ if class == ContentClass::UserListing => false,
        Role::CollegeAdmin if class.allows_department_override() => {
            same_department(scope.department.as_deref(), actor.department())
        }
        Role::CollegeAdmin | Role::Professor | Role::Student | Role::Alumni => {
            scope.is_created_by(actor.id())
        }
    }
}

#[cfg(test)]
mod tests;
