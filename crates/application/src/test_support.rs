use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use alumnet_core::{AppError, AppResult, PageRequest};
use alumnet_domain::{
    Actor, ApprovalDecision, ApprovalRecord, ApprovalStatus, BranchManagerGrant, ContentClass,
    ContentId, ContentItem, Role, UserId, ViewFilter,
};

use crate::{
    ApprovalRepository, AuditEvent, AuditRepository, ContentRepository, NewUserRecord,
    PasswordHasher, ScopeValues, UserRecord, UserRepository,
};

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, NewUserRecord>,
    approvals: HashMap<UserId, ApprovalRecord>,
    grants: HashMap<UserId, BranchManagerGrant>,
    content: Vec<ContentItem>,
    audit: Vec<AuditEvent>,
}

/// In-memory implementation of every repository port.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Inserts an account with the given approval state and returns its actor.
    pub(crate) async fn seed_user(
        &self,
        role: Role,
        department: Option<&str>,
        branch: Option<&str>,
        status: ApprovalStatus,
    ) -> Actor {
        let id = UserId::new();
        let now = Utc::now();
        let user = NewUserRecord {
            id,
            email: format!("{id}@college.edu"),
            display_name: format!("{role} {id}"),
            password_hash: FakePasswordHasher::hashed("correct horse battery"),
            role,
            department: department.map(str::to_owned),
            branch: branch.map(str::to_owned),
            created_at: now,
        };

        let mut approval = ApprovalRecord::pending(
            id,
            role,
            user.department.clone(),
            user.branch.clone(),
            now,
        );
        match status {
            ApprovalStatus::Pending => {}
            ApprovalStatus::Approved => {
                let _ = approval.resolve(ApprovalDecision::Approve, id, now);
            }
            ApprovalStatus::Rejected => {
                let _ = approval.resolve(ApprovalDecision::Reject, id, now);
            }
        }

        let actor = Actor::new(id, role, user.department.clone(), user.branch.clone());
        let mut state = self.state.lock().await;
        state.users.insert(id, user);
        state.approvals.insert(id, approval);
        actor
    }

    pub(crate) async fn seed_grant(&self, grant: BranchManagerGrant) {
        self.state
            .lock()
            .await
            .grants
            .insert(grant.professor(), grant);
    }

    pub(crate) async fn seed_content(&self, item: ContentItem) {
        self.state.lock().await.content.push(item);
    }

    pub(crate) async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.lock().await.audit.clone()
    }

    pub(crate) async fn content_count(&self) -> usize {
        self.state.lock().await.content.len()
    }

    fn to_record(state: &StoreState, user: &NewUserRecord) -> UserRecord {
        UserRecord {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            department: user.department.clone(),
            branch: user.branch.clone(),
            approval_status: state
                .approvals
                .get(&user.id)
                .map_or(ApprovalStatus::Pending, ApprovalRecord::status),
            created_at: user.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .map(|user| Self::to_record(&state, user)))
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .get(&user_id)
            .map(|user| Self::to_record(&state, user)))
    }

    async fn create(&self, user: NewUserRecord, approval: ApprovalRecord) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.id) {
            return Err(AppError::Conflict("duplicate user id".to_owned()));
        }
        state.approvals.insert(user.id, approval);
        state.users.insert(user.id, user);
        Ok(())
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state.users.values().any(|user| user.role == Role::Admin))
    }

    async fn list(
        &self,
        filter: &ViewFilter,
        role: Option<Role>,
        page: PageRequest,
    ) -> AppResult<Vec<UserRecord>> {
        let state = self.state.lock().await;
        let mut records: Vec<UserRecord> = state
            .users
            .values()
            .map(|user| Self::to_record(&state, user))
            .filter(|user| user.approval_status == ApprovalStatus::Approved)
            .filter(|user| role.is_none_or(|role| user.role == role))
            .filter(|user| filter.matches(&user.listing_scope()))
            .collect();
        records.sort_by(|left, right| left.email.cmp(&right.email));

        Ok(records
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect())
    }

    async fn update_scope(
        &self,
        user_id: UserId,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))?;
        user.role = role;
        user.department = department;
        user.branch = branch;
        Ok(())
    }

    async fn scope_values(&self) -> AppResult<ScopeValues> {
        let state = self.state.lock().await;
        Ok(ScopeValues {
            departments: state
                .users
                .values()
                .filter_map(|user| user.department.clone())
                .collect(),
            branches: state
                .users
                .values()
                .filter_map(|user| user.branch.clone())
                .collect(),
        })
    }
}

#[async_trait]
impl ApprovalRepository for InMemoryStore {
    async fn find_record(&self, user_id: UserId) -> AppResult<Option<ApprovalRecord>> {
        Ok(self.state.lock().await.approvals.get(&user_id).cloned())
    }

    async fn list_pending(&self, filter: &ViewFilter) -> AppResult<Vec<ApprovalRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .approvals
            .values()
            .filter(|record| record.is_pending())
            .filter(|record| filter.matches(&record.listing_scope()))
            .cloned()
            .collect())
    }

    async fn save_record(&self, record: &ApprovalRecord) -> AppResult<()> {
        self.state
            .lock()
            .await
            .approvals
            .insert(record.user_id(), record.clone());
        Ok(())
    }

    async fn find_grant(&self, professor: UserId) -> AppResult<Option<BranchManagerGrant>> {
        Ok(self.state.lock().await.grants.get(&professor).cloned())
    }

    async fn save_grant(&self, grant: &BranchManagerGrant) -> AppResult<()> {
        self.seed_grant(grant.clone()).await;
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn insert(&self, item: &ContentItem) -> AppResult<()> {
        self.seed_content(item.clone()).await;
        Ok(())
    }

    async fn find(&self, content_id: ContentId) -> AppResult<Option<ContentItem>> {
        let state = self.state.lock().await;
        Ok(state
            .content
            .iter()
            .find(|item| item.id() == content_id)
            .cloned())
    }

    async fn list(
        &self,
        class: ContentClass,
        filter: &ViewFilter,
        page: PageRequest,
    ) -> AppResult<Vec<ContentItem>> {
        let state = self.state.lock().await;
        Ok(state
            .content
            .iter()
            .rev()
            .filter(|item| item.class() == class && filter.matches(item.scope()))
            .skip(page.offset())
            .take(page.limit())
            .cloned()
            .collect())
    }

    async fn list_all(&self, class: ContentClass) -> AppResult<Vec<ContentItem>> {
        let state = self.state.lock().await;
        Ok(state
            .content
            .iter()
            .filter(|item| item.class() == class)
            .cloned()
            .collect())
    }

    async fn update(&self, item: &ContentItem) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let slot = state
            .content
            .iter_mut()
            .find(|existing| existing.id() == item.id())
            .ok_or_else(|| AppError::NotFound(format!("content '{}' not found", item.id())))?;
        *slot = item.clone();
        Ok(())
    }

    async fn delete(&self, content_ids: &[ContentId]) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.content.len();
        state.content.retain(|item| !content_ids.contains(&item.id()));
        Ok((before - state.content.len()) as u64)
    }
}

#[async_trait]
impl AuditRepository for InMemoryStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.audit.push(event);
        Ok(())
    }
}

/// Reversible stand-in for Argon2.
pub(crate) struct FakePasswordHasher;

impl FakePasswordHasher {
    pub(crate) fn hashed(password: &str) -> String {
        format!("hashed:{password}")
    }
}

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(Self::hashed(password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(Self::hashed(password) == hash)
    }
}
