//! Compiles a [`ViewFilter`] into a parameterised SQL predicate.
//!
//! The emitted predicate matches exactly the rows for which
//! [`ViewFilter::matches`] would return true on the row's scope.

use sqlx::{Postgres, QueryBuilder};

use alumnet_domain::{ScopeClause, ViewFilter};

/// Column names carrying scope attributes in one table.
///
/// A missing column is treated as an attribute that is never set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScopeColumns {
    pub department: &'static str,
    pub branch: &'static str,
    pub target_audience: Option<&'static str>,
    pub visibility: Option<&'static str>,
}

/// Appends a parenthesised predicate equivalent to `filter`.
pub(crate) fn push_view_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &ViewFilter,
    columns: &ScopeColumns,
) {
    match filter {
        ViewFilter::Unrestricted => {
            builder.push("TRUE");
        }
        ViewFilter::All(nodes) => push_group(builder, nodes, " AND ", "TRUE", columns),
        ViewFilter::Any(nodes) => push_group(builder, nodes, " OR ", "FALSE", columns),
        ViewFilter::Scope(clause) => push_clause(builder, clause, columns),
    }
}

fn push_group(
    builder: &mut QueryBuilder<'_, Postgres>,
    nodes: &[ViewFilter],
    separator: &str,
    empty: &str,
    columns: &ScopeColumns,
) {
    if nodes.is_empty() {
        builder.push(empty);
        return;
    }

    builder.push('(');
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            builder.push(separator);
        }
        push_view_filter(builder, node, columns);
    }
    builder.push(')');
}

/// Whitespace stripped from scope values, mirroring `str::trim` for the
/// characters that occur in stored text.
const SCOPE_WHITESPACE: &str = r"E' \t\n\r\f\013'";

fn push_trimmed(builder: &mut QueryBuilder<'_, Postgres>, column: &str) {
    builder.push("BTRIM(");
    builder.push(column);
    builder.push(", ");
    builder.push(SCOPE_WHITESPACE);
    builder.push(')');
}

fn push_unset(builder: &mut QueryBuilder<'_, Postgres>, column: &str) {
    builder.push("COALESCE(");
    push_trimmed(builder, column);
    builder.push(", '') = ''");
}

fn push_clause(
    builder: &mut QueryBuilder<'_, Postgres>,
    clause: &ScopeClause,
    columns: &ScopeColumns,
) {
    match clause {
        ScopeClause::DepartmentScoped { department } => {
            let column = columns.department;
            builder.push('(');
            push_unset(builder, column);
            builder.push(" OR LOWER(");
            push_trimmed(builder, column);
            builder.push(") = LOWER(BTRIM(");
            builder.push_bind(department.clone());
            builder.push(", ");
            builder.push(SCOPE_WHITESPACE);
            builder.push(")))");
        }
        ScopeClause::BranchScoped { branch } => {
            let column = columns.branch;
            builder.push('(');
            push_unset(builder, column);
            builder.push(" OR ");
            push_trimmed(builder, column);
            builder.push(" = BTRIM(");
            builder.push_bind(branch.clone());
            builder.push(", ");
            builder.push(SCOPE_WHITESPACE);
            builder.push("))");
        }
        ScopeClause::BranchUnset => {
            builder.push('(');
            push_unset(builder, columns.branch);
            builder.push(')');
        }
        ScopeClause::AudienceScoped { role } => match columns.target_audience {
            Some(column) => {
                builder.push('(');
                builder.push(column);
                builder.push(" IS NULL OR cardinality(");
                builder.push(column);
                builder.push(") = 0 OR ");
                builder.push_bind(role.as_str().to_owned());
                builder.push(" = ANY(");
                builder.push(column);
                builder.push("))");
            }
            None => {
                builder.push("TRUE");
            }
        },
        ScopeClause::VisibilityIs { visibility } => match (columns.visibility, visibility) {
            (Some(column), Some(visibility)) => {
                builder.push('(');
                builder.push(column);
                builder.push(" = ");
                builder.push_bind(visibility.as_str().to_owned());
                builder.push(')');
            }
            (Some(column), None) => {
                builder.push('(');
                builder.push(column);
                builder.push(" IS NULL)");
            }
            (None, Some(_)) => {
                builder.push("FALSE");
            }
            (None, None) => {
                builder.push("TRUE");
            }
        },
    }
}
