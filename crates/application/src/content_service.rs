//! Scoped content ports and application service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use alumnet_core::{AppError, AppResult, PageRequest};
use alumnet_domain::{
    Actor, AuditAction, ContentBody, ContentClass, ContentId, ContentItem, ContentScope,
    PostVisibility, Role, ViewFilter, build_view_filter, can_mutate, can_view,
    scope::{normalize_scope_value, same_department},
};

use crate::{AuditEvent, AuditRepository};


/// Repository port for content persistence.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Inserts a new item.
    async fn insert(&self, item: &ContentItem) -> AppResult<()>;

    /// Finds an item by id.
    async fn find(&self, content_id: ContentId) -> AppResult<Option<ContentItem>>;

    /// Lists items of `class` passing `filter`, newest first.
    async fn list(
        &self,
        class: ContentClass,
        filter: &ViewFilter,
        page: PageRequest,
    ) -> AppResult<Vec<ContentItem>>;

    /// Lists every item of `class`, unpaged.
    async fn list_all(&self, class: ContentClass) -> AppResult<Vec<ContentItem>>;

    /// Replaces scope, body and update time of an item.
    async fn update(&self, item: &ContentItem) -> AppResult<()>;

    /// Deletes items by id and returns how many were removed.
    async fn delete(&self, content_ids: &[ContentId]) -> AppResult<u64>;
}

/// Scope attributes supplied by an author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeInput {
    /// Target department. Non-administrators default to their own.
    pub department: Option<String>,
    /// Target branch.
    pub branch: Option<String>,
    /// Addressed roles. Empty means everyone.
    pub target_audience: Vec<Role>,
    /// Post visibility level.
    pub visibility: Option<PostVisibility>,
}

/// Input for creating or replacing an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInput {
    /// Access-control attributes.
    pub scope: ScopeInput,
    /// Class-specific payload.
    pub body: ContentBody,
}

/// Listing options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentListQuery {
    /// Keep events, jobs and meetings whose date has passed.
    pub include_expired: bool,
    /// Page window applied in the store.
    pub page: PageRequest,
}

/// Application service for events, jobs, posts and meetings.
#[derive(Clone)]
pub struct ContentService {
    content_repository: Arc<dyn ContentRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ContentService {
    /// Creates a new content service.
    #[must_use]
    pub fn new(
        content_repository: Arc<dyn ContentRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            content_repository,
            audit_repository,
        }
    }

    /// Publishes a new item authored by the actor.
    pub async fn create(
        &self,
        actor: &Actor,
        class: ContentClass,
        input: ContentInput,
    ) -> AppResult<ContentItem> {
        require_stored_class(class)?;
        require_scoped_actor(actor)?;

        if !class.can_be_created_by(actor.role()) {
            return Err(AppError::Forbidden(format!(
                "{} accounts may not create {} items",
                actor.role(),
                class.as_str()
            )));
        }
        if input.body.class() != class {
            return Err(AppError::Validation(format!(
                "expected a {} body, got a {}",
                class.as_str(),
                input.body.class().as_str()
            )));
        }

        let scope = author_scope(actor, input.scope)?;
        let item = ContentItem::new(
            ContentId::new(),
            ContentScope {
                created_by: Some(actor.id()),
                ..scope
            },
            input.body,
            Utc::now(),
        )?;

        self.content_repository.insert(&item).await?;
        Ok(item)
    }

    /// Lists the items of `class` visible to the actor.
    ///
    /// The store applies the visibility filter and page window; expiry is
    /// applied afterwards, so a page may hold fewer rows than its limit.
    pub async fn list(
        &self,
        actor: &Actor,
        class: ContentClass,
        query: ContentListQuery,
    ) -> AppResult<Vec<ContentItem>> {
        require_stored_class(class)?;
        let filter = build_view_filter(actor, class)?;

        let mut items = self
            .content_repository
            .list(class, &filter, query.page)
            .await?;

        if !query.include_expired {
            let now = Utc::now();
            items.retain(|item| !item.is_expired(now));
        }

        Ok(items)
    }

    /// Returns one item if the actor may see it.
    pub async fn get(&self, actor: &Actor, content_id: ContentId) -> AppResult<ContentItem> {
        self.load_visible(actor, content_id).await
    }

    /// Replaces scope and body of an item the actor may mutate.
    pub async fn update(
        &self,
        actor: &Actor,
        content_id: ContentId,
        input: ContentInput,
    ) -> AppResult<ContentItem> {
        let existing = self.load_mutable(actor, content_id).await?;
        let scope = author_scope(actor, input.scope)?;
        let revised = existing.revise(scope, input.body, Utc::now())?;

        self.content_repository.update(&revised).await?;
        Ok(revised)
    }

    /// Deletes an item the actor may mutate.
    pub async fn delete(&self, actor: &Actor, content_id: ContentId) -> AppResult<()> {
        let existing = self.load_mutable(actor, content_id).await?;
        self.content_repository.delete(&[existing.id()]).await?;
        Ok(())
    }

    /// Deletes every event, job and meeting expired at `now`.
    pub async fn purge_expired(&self, actor: &Actor, now: DateTime<Utc>) -> AppResult<u64> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden(
                "only administrators may purge content".to_owned(),
            ));
        }

        let mut expired = Vec::new();
        for class in [ContentClass::Event, ContentClass::Job, ContentClass::Meeting] {
            expired.extend(
                self.content_repository
                    .list_all(class)
                    .await?
                    .into_iter()
                    .filter(|item| item.is_expired(now))
                    .map(|item| item.id()),
            );
        }

        if expired.is_empty() {
            return Ok(0);
        }

        let removed = self.content_repository.delete(&expired).await?;
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.id(),
                action: AuditAction::ContentPurged,
                resource_type: "content".to_owned(),
                resource_id: now.to_rfc3339(),
                detail: Some(format!("removed={removed}")),
            })
            .await?;

        Ok(removed)
    }

    async fn load_visible(&self, actor: &Actor, content_id: ContentId) -> AppResult<ContentItem> {
        require_scoped_actor(actor)?;

        self.content_repository
            .find(content_id)
            .await?
            .filter(|item| can_view(actor, item.scope(), item.class()))
            .ok_or_else(|| AppError::NotFound(format!("content '{content_id}' not found")))
    }

    async fn load_mutable(&self, actor: &Actor, content_id: ContentId) -> AppResult<ContentItem> {
        let item = self.load_visible(actor, content_id).await?;
        if !can_mutate(actor, item.scope(), item.class()) {
            return Err(AppError::Forbidden(format!(
                "{} '{}' may not modify {} '{}'",
                actor.role(),
                actor.id(),
                item.class().as_str(),
                content_id
            )));
        }

        Ok(item)
    }
}

fn require_stored_class(class: ContentClass) -> AppResult<()> {
    if ContentClass::stored().contains(&class) {
        return Ok(());
    }

    Err(AppError::Validation(format!(
        "'{}' is not a content class",
        class.as_str()
    )))
}

fn require_scoped_actor(actor: &Actor) -> AppResult<()> {
    if actor.is_admin() {
        return Ok(());
    }

    actor.require_department()?;
    Ok(())
}

/// Resolves the scope an author may publish under.
///
/// Non-administrators publish inside their own department only; an omitted
/// department defaults to theirs.
fn author_scope(actor: &Actor, input: ScopeInput) -> AppResult<ContentScope> {
    let requested = normalize_scope_value(input.department);

    let department = if actor.is_admin() {
        requested
    } else {
        let own = actor.require_department()?;
        match requested {
            Some(requested) if !same_department(Some(&requested), Some(own)) => {
                return Err(AppError::Forbidden(format!(
                    "{} accounts may only publish to their own department",
                    actor.role()
                )));
            }
            _ => Some(own.to_owned()),
        }
    };

    Ok(ContentScope {
        department,
        branch: input.branch,
        target_audience: Some(input.target_audience),
        visibility: input.visibility,
        created_by: None,
    }
    .normalized())
}
