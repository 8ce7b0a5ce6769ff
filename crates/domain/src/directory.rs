use serde::{Deserialize, Serialize};

use crate::scope::normalize_scope_value;

/// Distinct departments and branches currently in use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDirectory {
    departments: Vec<String>,
    branches: Vec<String>,
}

impl ScopeDirectory {
    /// Builds a directory from raw stored values.
    ///
    /// Blank values are dropped. Departments collapse case-insensitively
    /// keeping the first spelling seen; branches collapse only when equal.
    #[must_use]
    pub fn from_values<D, B>(departments: D, branches: B) -> Self
    where
        D: IntoIterator<Item = Option<String>>,
        B: IntoIterator<Item = Option<String>>,
    {
        let mut distinct_departments: Vec<String> = Vec::new();
        for department in departments.into_iter().filter_map(normalize_scope_value) {
            let lowered = department.to_lowercase();
            if !distinct_departments
                .iter()
                .any(|known| known.to_lowercase() == lowered)
            {
                distinct_departments.push(department);
            }
        }

        let mut distinct_branches: Vec<String> = branches
            .into_iter()
            .filter_map(normalize_scope_value)
            .collect();
        distinct_branches.sort();
        distinct_branches.dedup();

        distinct_departments.sort_by_key(|department| department.to_lowercase());

        Self {
            departments: distinct_departments,
            branches: distinct_branches,
        }
    }

    /// Returns the known departments.
    #[must_use]
    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    /// Returns the known branches.
    #[must_use]
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Returns whether the department is in use, ignoring case.
    #[must_use]
    pub fn is_known_department(&self, department: &str) -> bool {
        let lowered = department.trim().to_lowercase();
        self.departments
            .iter()
            .any(|known| known.to_lowercase() == lowered)
    }

    /// Returns whether the branch is in use.
    #[must_use]
    pub fn is_known_branch(&self, branch: &str) -> bool {
        let trimmed = branch.trim();
        self.branches.iter().any(|known| known == trimmed)
    }
}
