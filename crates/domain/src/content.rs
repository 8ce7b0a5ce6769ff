//! Scoped content: events, jobs, posts and meetings.

use std::str::FromStr;

use alumnet_core::{AppError, AppResult, NonEmptyString};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scope::normalize_scope_value;
use crate::{Role, UserId};

/// Classes of records governed by the visibility resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    /// Campus or alumni events.
    Event,
    /// Job and internship postings.
    Job,
    /// Feed posts.
    Post,
    /// Online meetings and mentoring sessions.
    Meeting,
    /// The user directory itself.
    UserListing,
}

impl ContentClass {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Job => "job",
            Self::Post => "post",
            Self::Meeting => "meeting",
            Self::UserListing => "user_listing",
        }
    }

    /// Classes persisted as content items.
    #[must_use]
    pub fn stored() -> &'static [Self] {
        const STORED: &[ContentClass] = &[
            ContentClass::Event,
            ContentClass::Job,
            ContentClass::Post,
            ContentClass::Meeting,
        ];

        STORED
    }

    /// Returns whether a role may author records of this class.
    #[must_use]
    pub fn can_be_created_by(&self, role: Role) -> bool {
        match self {
            Self::Event => matches!(role, Role::Admin | Role::CollegeAdmin | Role::Professor),
            Self::Job | Self::Meeting => !matches!(role, Role::Student),
            Self::Post => true,
            Self::UserListing => false,
        }
    }

    /// Returns whether a collegeadmin may mutate department records it did
    /// not create.
    #[must_use]
    pub fn allows_department_override(&self) -> bool {
        matches!(self, Self::Event | Self::Job)
    }
}

impl FromStr for ContentClass {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "event" | "events" => Ok(Self::Event),
            "job" | "jobs" => Ok(Self::Job),
            "post" | "posts" => Ok(Self::Post),
            "meeting" | "meetings" => Ok(Self::Meeting),
            _ => Err(AppError::Validation(format!(
                "unknown content class '{value}'"
            ))),
        }
    }
}

/// Who a post is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostVisibility {
    /// Everyone in the post's department.
    Department,
    /// Everyone in the post's department and branch.
    Branch,
    /// Everyone on the platform.
    Public,
}

impl PostVisibility {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Branch => "branch",
            Self::Public => "public",
        }
    }
}

impl FromStr for PostVisibility {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "department" => Ok(Self::Department),
            "branch" => Ok(Self::Branch),
            "public" => Ok(Self::Public),
            _ => Err(AppError::Validation(format!(
                "unknown post visibility '{value}'"
            ))),
        }
    }
}

/// Access-control attributes of a scoped record.
///
/// Any unset attribute places no restriction on its axis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentScope {
    /// Owning department.
    pub department: Option<String>,
    /// Owning branch inside the department.
    pub branch: Option<String>,
    /// Roles the record is addressed to.
    pub target_audience: Option<Vec<Role>>,
    /// Post visibility level; unused by other classes.
    pub visibility: Option<PostVisibility>,
    /// Author of the record. Legacy rows may lack one.
    pub created_by: Option<UserId>,
}

impl ContentScope {
    /// Returns a copy with blank strings and empty audiences mapped to unset.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut target_audience = self.target_audience.filter(|roles| !roles.is_empty());
        if let Some(roles) = target_audience.as_mut() {
            roles.sort();
            roles.dedup();
        }

        Self {
            department: normalize_scope_value(self.department),
            branch: normalize_scope_value(self.branch),
            target_audience,
            visibility: self.visibility,
            created_by: self.created_by,
        }
    }

    /// Returns the audience as a slice, if set.
    #[must_use]
    pub fn audience(&self) -> Option<&[Role]> {
        self.target_audience.as_deref()
    }

    /// Returns whether the record was created by the given account.
    #[must_use]
    pub fn is_created_by(&self, user_id: UserId) -> bool {
        self.created_by == Some(user_id)
    }
}

/// Unique identifier for a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(Uuid);

impl ContentId {
    /// Creates a new random content identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a content identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid content id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Class-specific payload of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBody {
    /// Event details.
    Event {
        /// Event title.
        title: NonEmptyString,
        /// Long description.
        description: String,
        /// Venue, if any.
        location: Option<String>,
        /// Start time.
        starts_at: DateTime<Utc>,
        /// End time, if known.
        ends_at: Option<DateTime<Utc>>,
    },
    /// Job posting details.
    Job {
        /// Position title.
        title: NonEmptyString,
        /// Hiring company.
        company: NonEmptyString,
        /// Role description.
        description: String,
        /// Work location, if any.
        location: Option<String>,
        /// Full-time, internship, and so on.
        employment_type: Option<String>,
        /// Where to apply.
        apply_url: Option<String>,
        /// Last day to apply.
        deadline: Option<DateTime<Utc>>,
    },
    /// Feed post text.
    Post {
        /// Post text.
        body: NonEmptyString,
    },
    /// Meeting details.
    Meeting {
        /// Meeting title.
        title: NonEmptyString,
        /// Agenda, if any.
        agenda: Option<String>,
        /// Join link.
        meeting_url: NonEmptyString,
        /// Scheduled start.
        scheduled_at: DateTime<Utc>,
        /// Planned duration.
        duration_minutes: Option<u32>,
    },
}

impl ContentBody {
    /// Returns the class this body belongs to.
    #[must_use]
    pub fn class(&self) -> ContentClass {
        match self {
            Self::Event { .. } => ContentClass::Event,
            Self::Job { .. } => ContentClass::Job,
            Self::Post { .. } => ContentClass::Post,
            Self::Meeting { .. } => ContentClass::Meeting,
        }
    }

    /// Returns the instant after which the item is stale, if it expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Event {
                starts_at, ends_at, ..
            } => Some(ends_at.unwrap_or(*starts_at)),
            Self::Job { deadline, .. } => *deadline,
            Self::Post { .. } => None,
            Self::Meeting {
                scheduled_at,
                duration_minutes,
                ..
            } => Some(*scheduled_at + Duration::minutes(i64::from(duration_minutes.unwrap_or(0)))),
        }
    }

    fn validate(&self) -> AppResult<()> {
        if let Self::Event {
            starts_at,
            ends_at: Some(ends_at),
            ..
        } = self
            && ends_at < starts_at
        {
            return Err(AppError::Validation(
                "event end must not precede its start".to_owned(),
            ));
        }

        Ok(())
    }
}

/// A persisted event, job, post or meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    id: ContentId,
    scope: ContentScope,
    body: ContentBody,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Creates a new item with a normalized scope.
    pub fn new(
        id: ContentId,
        scope: ContentScope,
        body: ContentBody,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Self::restore(id, scope, body, created_at, created_at)
    }

    /// Rehydrates a stored item.
    pub fn restore(
        id: ContentId,
        scope: ContentScope,
        body: ContentBody,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        body.validate()?;
        let scope = scope.normalized();
        if body.class() != ContentClass::Post && scope.visibility.is_some() {
            return Err(AppError::Validation(
                "only posts carry a visibility level".to_owned(),
            ));
        }

        Ok(Self {
            id,
            scope,
            body,
            created_at,
            updated_at,
        })
    }

    /// Returns the item id.
    #[must_use]
    pub fn id(&self) -> ContentId {
        self.id
    }

    /// Returns the item class.
    #[must_use]
    pub fn class(&self) -> ContentClass {
        self.body.class()
    }

    /// Returns the access-control attributes.
    #[must_use]
    pub fn scope(&self) -> &ContentScope {
        &self.scope
    }

    /// Returns the class-specific payload.
    #[must_use]
    pub fn body(&self) -> &ContentBody {
        &self.body
    }

    /// Returns the creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the item has passed its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.body.expires_at().is_some_and(|expires_at| expires_at < now)
    }

    /// Returns a copy with replaced scope and body, keeping identity and
    /// creator.
    pub fn revise(
        &self,
        scope: ContentScope,
        body: ContentBody,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if body.class() != self.class() {
            return Err(AppError::Validation(format!(
                "cannot change a {} into a {}",
                self.class().as_str(),
                body.class().as_str()
            )));
        }

        Self::restore(
            self.id,
            ContentScope {
                created_by: self.scope.created_by,
                ..scope
            },
            body,
            self.created_at,
            updated_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid timestamp"))
    }

    fn title(value: &str) -> NonEmptyString {
        NonEmptyString::new(value).unwrap_or_else(|_| panic!("non-empty title"))
    }

    #[test]
    fn scope_normalization_maps_blank_to_unset() {
        let scope = ContentScope {
            department: Some(" ".to_owned()),
            branch: Some(" mca ".to_owned()),
            target_audience: Some(vec![]),
            ..ContentScope::default()
        }
        .normalized();

        assert_eq!(scope.department, None);
        assert_eq!(scope.branch.as_deref(), Some("mca"));
        assert_eq!(scope.target_audience, None);
    }

    #[test]
    fn event_expires_at_end_or_start() {
        let body = ContentBody::Event {
            title: title("Reunion"),
            description: String::new(),
            location: None,
            starts_at: at(9),
            ends_at: None,
        };
        assert_eq!(body.expires_at(), Some(at(9)));

        let item = ContentItem::new(ContentId::new(), ContentScope::default(), body, at(1));
        let item = item.unwrap_or_else(|_| panic!("valid event"));
        assert!(item.is_expired(at(10)));
        assert!(!item.is_expired(at(8)));
    }

    #[test]
    fn meeting_expiry_includes_duration() {
        let body = ContentBody::Meeting {
            title: title("Mentoring"),
            agenda: None,
            meeting_url: title("https://meet.example.org/abc"),
            scheduled_at: at(9),
            duration_minutes: Some(120),
        };
        assert_eq!(body.expires_at(), Some(at(11)));
    }

    #[test]
    fn event_end_before_start_is_rejected() {
        let body = ContentBody::Event {
            title: title("Backwards"),
            description: String::new(),
            location: None,
            starts_at: at(10),
            ends_at: Some(at(9)),
        };
        assert!(ContentItem::new(ContentId::new(), ContentScope::default(), body, at(1)).is_err());
    }

    #[test]
    fn visibility_is_reserved_for_posts() {
        let scope = ContentScope {
            visibility: Some(PostVisibility::Public),
            ..ContentScope::default()
        };
        let body = ContentBody::Job {
            title: title("Engineer"),
            company: title("Acme"),
            description: String::new(),
            location: None,
            employment_type: None,
            apply_url: None,
            deadline: None,
        };
        assert!(ContentItem::new(ContentId::new(), scope, body, at(1)).is_err());
    }

    #[test]
    fn revise_keeps_creator_and_class() {
        let creator = UserId::new();
        let item = ContentItem::new(
            ContentId::new(),
            ContentScope {
                created_by: Some(creator),
                ..ContentScope::default()
            },
            ContentBody::Post { body: title("hello") },
            at(1),
        )
        .unwrap_or_else(|_| panic!("valid post"));

        let revised = item
            .revise(
                ContentScope::default(),
                ContentBody::Post { body: title("edited") },
                at(2),
            )
            .unwrap_or_else(|_| panic!("valid revision"));
        assert!(revised.scope().is_created_by(creator));
        assert_eq!(revised.updated_at(), at(2));

        let wrong_class = item.revise(
            ContentScope::default(),
            ContentBody::Job {
                title: title("Engineer"),
                company: title("Acme"),
                description: String::new(),
                location: None,
                employment_type: None,
                apply_url: None,
                deadline: None,
            },
            at(2),
        );
        assert!(wrong_class.is_err());
    }

    #[test]
    fn body_serializes_with_kind_tag() {
        let body = ContentBody::Post { body: title("hi") };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["kind"], "post");
    }
}
