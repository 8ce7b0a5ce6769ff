//! Declarative visibility predicate.
//!
//! A [`ViewFilter`] is produced once per (actor, class) and either compiled
//! into a store query or evaluated in memory with [`ViewFilter::matches`].
//! Every scope clause already includes the "field absent" case.

use serde::{Deserialize, Serialize};

use crate::scope::{audience_allows, branch_allows, department_allows, scope_value_is_unset};
use crate::{ContentScope, PostVisibility, Role};

/// One scoping condition over a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScopeClause {
    /// Department unset, or equal ignoring case.
    DepartmentScoped {
        /// Department of the actor.
        department: String,
    },
    /// Branch unset, or equal exactly.
    BranchScoped {
        /// Branch of the actor.
        branch: String,
    },
    /// Branch unset. Used for actors without a branch of their own.
    BranchUnset,
    /// Audience unset/empty, or containing the role.
    AudienceScoped {
        /// Role of the actor.
        role: Role,
    },
    /// Post visibility equals the value; `None` matches unset visibility.
    VisibilityIs {
        /// Expected visibility.
        visibility: Option<PostVisibility>,
    },
}

impl ScopeClause {
    /// Evaluates the clause against a record scope.
    #[must_use]
    pub fn matches(&self, scope: &ContentScope) -> bool {
        match self {
            Self::DepartmentScoped { department } => {
                department_allows(scope.department.as_deref(), department)
            }
            Self::BranchScoped { branch } => branch_allows(scope.branch.as_deref(), branch),
            Self::BranchUnset => scope_value_is_unset(scope.branch.as_deref()),
            Self::AudienceScoped { role } => audience_allows(scope.audience(), *role),
            Self::VisibilityIs { visibility } => scope.visibility == *visibility,
        }
    }
}

/// Boolean tree of scope clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "nodes", rename_all = "snake_case")]
pub enum ViewFilter {
    /// Every record passes.
    Unrestricted,
    /// All nested filters must pass. An empty list passes.
    All(Vec<ViewFilter>),
    /// At least one nested filter must pass. An empty list fails.
    Any(Vec<ViewFilter>),
    /// A single clause.
    Scope(ScopeClause),
}

impl ViewFilter {
    /// Shorthand for a department clause.
    #[must_use]
    pub fn department(department: impl Into<String>) -> Self {
        Self::Scope(ScopeClause::DepartmentScoped {
            department: department.into(),
        })
    }

    /// Shorthand for a branch clause.
    #[must_use]
    pub fn branch(branch: impl Into<String>) -> Self {
        Self::Scope(ScopeClause::BranchScoped {
            branch: branch.into(),
        })
    }

    /// Branch clause for an actor's optional branch: a set branch matches
    /// absent-or-equal, an unset one matches only unbranched records.
    #[must_use]
    pub fn branch_of(branch: Option<&str>) -> Self {
        match branch {
            Some(branch) => Self::branch(branch),
            None => Self::Scope(ScopeClause::BranchUnset),
        }
    }

    /// Shorthand for an audience clause.
    #[must_use]
    pub fn audience(role: Role) -> Self {
        Self::Scope(ScopeClause::AudienceScoped { role })
    }

    /// Shorthand for a visibility clause.
    #[must_use]
    pub fn visibility(visibility: Option<PostVisibility>) -> Self {
        Self::Scope(ScopeClause::VisibilityIs { visibility })
    }

    /// Evaluates the filter against a record scope.
    #[must_use]
    pub fn matches(&self, scope: &ContentScope) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::All(filters) => filters.iter().all(|filter| filter.matches(scope)),
            Self::Any(filters) => filters.iter().any(|filter| filter.matches(scope)),
            Self::Scope(clause) => clause.matches(scope),
        }
    }

    /// Returns whether the filter admits every record.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::All(filters) => filters.iter().all(Self::is_unrestricted),
            Self::Any(_) | Self::Scope(_) => false,
        }
    }
}
