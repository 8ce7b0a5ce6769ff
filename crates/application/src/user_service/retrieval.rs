use alumnet_domain::{ContentClass, ScopeDirectory, build_view_filter};

use super::*;

/// Whether claimed scope values are already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeClaimCheck {
    /// Department matches a known department, ignoring case.
    pub department_known: bool,
    /// Branch matches a known branch exactly.
    pub branch_known: bool,
}

impl UserService {
    /// Lists the accounts the actor may see.
    pub async fn list_users(
        &self,
        actor: &Actor,
        query: UserListQuery,
    ) -> AppResult<Vec<UserRecord>> {
        let filter = build_view_filter(actor, ContentClass::UserListing)?;
        self.user_repository
            .list(&filter, query.role, query.page)
            .await
    }

    /// Returns one account if the actor may see it.
    pub async fn get_user(&self, actor: &Actor, user_id: UserId) -> AppResult<UserRecord> {
        let filter = build_view_filter(actor, ContentClass::UserListing)?;

        self.user_repository
            .find_by_id(user_id)
            .await?
            .filter(|user| user.id == actor.id() || filter.matches(&user.listing_scope()))
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    /// Replaces role, department and branch of an account.
    pub async fn update_user_scope(
        &self,
        actor: &Actor,
        user_id: UserId,
        update: UpdateUserScope,
    ) -> AppResult<UserRecord> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden(
                "only administrators may change account scope".to_owned(),
            ));
        }

        let (department, branch) =
            require_scope_for_role(update.role, update.department, update.branch)?;

        if self.user_repository.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        }

        let detail = format!(
            "role={} department={} branch={}",
            update.role,
            department.as_deref().unwrap_or("-"),
            branch.as_deref().unwrap_or("-")
        );

        self.user_repository
            .update_scope(user_id, update.role, department, branch)
            .await?;
        self.audit(actor, AuditAction::UserScopeUpdated, user_id, Some(detail))
            .await?;

        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    /// Returns the departments and branches currently in use.
    pub async fn directory(&self) -> AppResult<ScopeDirectory> {
        let values = self.user_repository.scope_values().await?;
        Ok(ScopeDirectory::from_values(
            values.departments.into_iter().map(Some),
            values.branches.into_iter().map(Some),
        ))
    }

    /// Reports whether a department/branch claim matches existing values.
    pub async fn validate_scope_claim(
        &self,
        department: Option<&str>,
        branch: Option<&str>,
    ) -> AppResult<ScopeClaimCheck> {
        let directory = self.directory().await?;
        Ok(ScopeClaimCheck {
            department_known: department
                .is_some_and(|department| directory.is_known_department(department)),
            branch_known: branch.is_some_and(|branch| directory.is_known_branch(branch)),
        })
    }
}
