//! Approval queue and branch-manager delegation.
//!
//! Two approvers may resolve the same record concurrently; the store keeps
//! whichever write lands last. Each request still sees the record as
//! pending only if it was pending when loaded.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use alumnet_core::{AppError, AppResult};
use alumnet_domain::{
    Actor, ApprovalDecision, ApprovalRecord, AuditAction, BranchManagerGrant, ContentClass, Role,
    UserId, ViewFilter, build_view_filter, can_approve, can_manage_branch_manager,
    has_approval_authority,
};

use crate::{AuditEvent, AuditRepository, UserRepository};


/// Repository port for approval records and branch-manager grants.
#[async_trait]
pub trait ApprovalRepository: Send + Sync {
    /// Finds the approval record of an account.
    async fn find_record(&self, user_id: UserId) -> AppResult<Option<ApprovalRecord>>;

    /// Lists pending records whose department/branch pass `filter`.
    async fn list_pending(&self, filter: &ViewFilter) -> AppResult<Vec<ApprovalRecord>>;

    /// Persists a resolved record.
    async fn save_record(&self, record: &ApprovalRecord) -> AppResult<()>;

    /// Finds the grant of a professor.
    async fn find_grant(&self, professor: UserId) -> AppResult<Option<BranchManagerGrant>>;

    /// Inserts or replaces the grant of a professor.
    async fn save_grant(&self, grant: &BranchManagerGrant) -> AppResult<()>;
}

/// Application service for approving accounts.
#[derive(Clone)]
pub struct ApprovalService {
    approval_repository: Arc<dyn ApprovalRepository>,
    user_repository: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ApprovalService {
    /// Creates a new approval service.
    #[must_use]
    pub fn new(
        approval_repository: Arc<dyn ApprovalRepository>,
        user_repository: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            approval_repository,
            user_repository,
            audit_repository,
        }
    }

    /// Lists the pending accounts the actor may resolve.
    pub async fn list_pending(&self, actor: &Actor) -> AppResult<Vec<ApprovalRecord>> {
        let filter = build_view_filter(actor, ContentClass::UserListing)?;
        let grant = self.approver_grant(actor).await?;

        let pending = self.approval_repository.list_pending(&filter).await?;
        Ok(pending
            .into_iter()
            .filter(|record| can_approve(actor, grant.as_ref(), record))
            .collect())
    }

    /// Approves a pending account.
    pub async fn approve(&self, actor: &Actor, user_id: UserId) -> AppResult<ApprovalRecord> {
        self.resolve(actor, user_id, ApprovalDecision::Approve).await
    }

    /// Rejects a pending account.
    pub async fn reject(&self, actor: &Actor, user_id: UserId) -> AppResult<ApprovalRecord> {
        self.resolve(actor, user_id, ApprovalDecision::Reject).await
    }

    /// Makes a professor branch manager of its own branch.
    pub async fn assign_branch_manager(
        &self,
        actor: &Actor,
        professor_id: UserId,
    ) -> AppResult<BranchManagerGrant> {
        self.set_branch_manager(actor, professor_id, true).await
    }

    /// Revokes a professor's branch-manager grant.
    pub async fn remove_branch_manager(
        &self,
        actor: &Actor,
        professor_id: UserId,
    ) -> AppResult<BranchManagerGrant> {
        self.set_branch_manager(actor, professor_id, false).await
    }

    /// Returns the grant of a professor, visible to the professor and to
    /// whoever may manage it. Professors without a stored grant report a
    /// disabled one.
    pub async fn branch_manager_grant(
        &self,
        actor: &Actor,
        professor_id: UserId,
    ) -> AppResult<BranchManagerGrant> {
        let professor = self.load_professor(professor_id).await?;
        if actor.id() != professor_id && !can_manage_branch_manager(actor, &professor) {
            return Err(AppError::Forbidden(format!(
                "{} '{}' may not view branch-manager grant of '{}'",
                actor.role(),
                actor.id(),
                professor_id
            )));
        }

        Ok(self
            .approval_repository
            .find_grant(professor_id)
            .await?
            .unwrap_or_else(|| BranchManagerGrant::new(professor_id, false, None, Utc::now())))
    }

    async fn resolve(
        &self,
        actor: &Actor,
        user_id: UserId,
        decision: ApprovalDecision,
    ) -> AppResult<ApprovalRecord> {
        let mut record = self
            .approval_repository
            .find_record(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("approval for '{user_id}' not found")))?;

        let grant = self.approver_grant(actor).await?;
        if !has_approval_authority(actor, grant.as_ref(), &record) {
            return Err(AppError::Forbidden(format!(
                "{} '{}' may not resolve approval of {} '{}'",
                actor.role(),
                actor.id(),
                record.role(),
                user_id
            )));
        }

        if !record.is_pending() {
            return Err(AppError::Conflict(format!(
                "approval for account '{user_id}' is already {}",
                record.status().as_str()
            )));
        }

        record.resolve(decision, actor.id(), Utc::now())?;
        self.approval_repository.save_record(&record).await?;

        let action = match decision {
            ApprovalDecision::Approve => AuditAction::ApprovalApproved,
            ApprovalDecision::Reject => AuditAction::ApprovalRejected,
        };
        self.audit(actor, action, "approval", user_id, Some(record.role().to_string()))
            .await?;

        Ok(record)
    }

    async fn set_branch_manager(
        &self,
        actor: &Actor,
        professor_id: UserId,
        enabled: bool,
    ) -> AppResult<BranchManagerGrant> {
        let professor = self.load_professor(professor_id).await?;
        if !can_manage_branch_manager(actor, &professor) {
            return Err(AppError::Forbidden(format!(
                "{} '{}' may not manage branch managers of this department",
                actor.role(),
                actor.id()
            )));
        }

        let grant = BranchManagerGrant::new(professor_id, enabled, Some(actor.id()), Utc::now());
        self.approval_repository.save_grant(&grant).await?;

        let action = if enabled {
            AuditAction::BranchManagerAssigned
        } else {
            AuditAction::BranchManagerRemoved
        };
        self.audit(
            actor,
            action,
            "branch_manager",
            professor_id,
            professor.branch().map(str::to_owned),
        )
        .await?;

        Ok(grant)
    }

    async fn load_professor(&self, professor_id: UserId) -> AppResult<Actor> {
        let professor = self
            .user_repository
            .find_by_id(professor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{professor_id}' not found")))?;

        if professor.role != Role::Professor {
            return Err(AppError::Validation(format!(
                "account '{professor_id}' is not a professor"
            )));
        }

        Ok(professor.actor())
    }

    async fn approver_grant(&self, actor: &Actor) -> AppResult<Option<BranchManagerGrant>> {
        if actor.role() != Role::Professor {
            return Ok(None);
        }

        self.approval_repository.find_grant(actor.id()).await
    }

    async fn audit(
        &self,
        actor: &Actor,
        action: AuditAction,
        resource_type: &str,
        resource_id: UserId,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.id(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id: resource_id.to_string(),
                detail,
            })
            .await
    }
}
