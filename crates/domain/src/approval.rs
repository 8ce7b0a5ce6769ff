//! Account approval records and branch-manager grants.

use std::str::FromStr;

use alumnet_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scope::{normalize_scope_value, same_branch, same_department};
use crate::{Actor, ContentScope, Role, UserId};

/// Lifecycle state of an approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Waiting for an authorized approver.
    Pending,
    /// Account may sign in.
    Approved,
    /// Account was turned down.
    Rejected,
}

impl ApprovalStatus {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown approval status '{value}'"
            ))),
        }
    }
}

/// Outcome chosen by an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    /// Let the account in.
    Approve,
    /// Turn the account down.
    Reject,
}

impl ApprovalDecision {
    fn target_status(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Approval side-record created for every registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    user_id: UserId,
    role: Role,
    department: Option<String>,
    branch: Option<String>,
    status: ApprovalStatus,
    approved_by: Option<UserId>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ApprovalRecord {
    /// Creates a pending record for a freshly registered account.
    #[must_use]
    pub fn pending(
        user_id: UserId,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            role,
            department: normalize_scope_value(department),
            branch: normalize_scope_value(branch),
            status: ApprovalStatus::Pending,
            approved_by: None,
            resolved_at: None,
            created_at,
        }
    }

    /// Rehydrates a stored record.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn restore(
        user_id: UserId,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
        status: ApprovalStatus,
        approved_by: Option<UserId>,
        resolved_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            role,
            department: normalize_scope_value(department),
            branch: normalize_scope_value(branch),
            status,
            approved_by,
            resolved_at,
            created_at,
        }
    }

    /// Returns the account this record belongs to.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the role the account registered with.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the registered department.
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Returns the registered branch.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn status(&self) -> ApprovalStatus {
        self.status
    }

    /// Returns who resolved the record.
    #[must_use]
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// Returns when the record was resolved.
    #[must_use]
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns when the record was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the scope the record is listed under.
    #[must_use]
    pub fn listing_scope(&self) -> ContentScope {
        ContentScope {
            department: self.department.clone(),
            branch: self.branch.clone(),
            target_audience: None,
            visibility: None,
            created_by: Some(self.user_id),
        }
    }

    /// Returns whether the record still awaits a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Applies a decision. Records leave `Pending` exactly once; any later
    /// attempt is reported as a conflict and leaves the record untouched.
    pub fn resolve(
        &mut self,
        decision: ApprovalDecision,
        approver: UserId,
        resolved_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if !self.is_pending() {
            return Err(AppError::Conflict(format!(
                "approval for account '{}' is already {}",
                self.user_id,
                self.status.as_str()
            )));
        }

        self.status = decision.target_status();
        self.approved_by = Some(approver);
        self.resolved_at = Some(resolved_at);
        Ok(())
    }
}

/// Authority of a professor to approve students of its own branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchManagerGrant {
    professor: UserId,
    is_branch_manager: bool,
    can_approve_students: bool,
    granted_by: Option<UserId>,
    updated_at: DateTime<Utc>,
}

impl BranchManagerGrant {
    /// Creates a grant with both flags set to `enabled`.
    #[must_use]
    pub fn new(
        professor: UserId,
        enabled: bool,
        granted_by: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            professor,
            is_branch_manager: enabled,
            can_approve_students: enabled,
            granted_by,
            updated_at,
        }
    }

    /// Rehydrates a stored grant.
    #[must_use]
    pub fn restore(
        professor: UserId,
        is_branch_manager: bool,
        can_approve_students: bool,
        granted_by: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            professor,
            is_branch_manager,
            can_approve_students,
            granted_by,
            updated_at,
        }
    }

    /// Returns the professor holding the grant.
    #[must_use]
    pub fn professor(&self) -> UserId {
        self.professor
    }

    /// Returns whether the professor manages its branch.
    #[must_use]
    pub fn is_branch_manager(&self) -> bool {
        self.is_branch_manager
    }

    /// Returns whether the professor may approve students.
    #[must_use]
    pub fn can_approve_students(&self) -> bool {
        self.can_approve_students
    }

    /// Returns who last changed the grant.
    #[must_use]
    pub fn granted_by(&self) -> Option<UserId> {
        self.granted_by
    }

    /// Returns when the grant last changed.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the grant authorizes student approvals.
    #[must_use]
    pub fn authorizes_student_approval(&self) -> bool {
        self.is_branch_manager && self.can_approve_students
    }
}

/// Returns whether `approver` may resolve the approval `record`.
///
/// `approver_grant` is the approver's own branch-manager grant, consulted
/// only for professors. Records that are no longer pending are never
/// approvable.
#[must_use]
pub fn can_approve(
    approver: &Actor,
    approver_grant: Option<&BranchManagerGrant>,
    record: &ApprovalRecord,
) -> bool {
    record.is_pending() && has_approval_authority(approver, approver_grant, record)
}

/// Returns whether `approver` has authority over the role and scope of
/// `record`, whatever its current status.
#[must_use]
pub fn has_approval_authority(
    approver: &Actor,
    approver_grant: Option<&BranchManagerGrant>,
    record: &ApprovalRecord,
) -> bool {
    if !approver.has_valid_scope() || approver.id() == record.user_id() {
        return false;
    }

    match approver.role() {
        Role::Admin => true,
        Role::CollegeAdmin => {
            matches!(
                record.role(),
                Role::Professor | Role::Student | Role::Alumni
            ) && same_department(record.department(), approver.department())
        }
        Role::Professor => {
            record.role() == Role::Student
                && approver_grant.is_some_and(|grant| {
                    grant.professor() == approver.id() && grant.authorizes_student_approval()
                })
                && same_department(record.department(), approver.department())
                && same_branch(record.branch(), approver.branch())
        }
        Role::Student | Role::Alumni => false,
    }
}

/// Returns whether `grantor` may assign or revoke the branch-manager grant
/// of `professor`.
#[must_use]
pub fn can_manage_branch_manager(grantor: &Actor, professor: &Actor) -> bool {
    if professor.role() != Role::Professor || !grantor.has_valid_scope() {
        return false;
    }

    match grantor.role() {
        Role::Admin => true,
        Role::CollegeAdmin => same_department(professor.department(), grantor.department()),
        Role::Professor | Role::Student | Role::Alumni => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid timestamp"))
    }

    fn actor(role: Role, department: Option<&str>, branch: Option<&str>) -> Actor {
        Actor::new(
            UserId::new(),
            role,
            department.map(str::to_owned),
            branch.map(str::to_owned),
        )
    }

    fn pending(role: Role, department: Option<&str>, branch: Option<&str>) -> ApprovalRecord {
        ApprovalRecord::pending(
            UserId::new(),
            role,
            department.map(str::to_owned),
            branch.map(str::to_owned),
            now(),
        )
    }

    fn manager_grant(professor: &Actor, enabled: bool) -> BranchManagerGrant {
        BranchManagerGrant::new(professor.id(), enabled, None, now())
    }

    #[test]
    fn scenario_d_collegeadmin_approves_professor_case_insensitively() {
        let college_admin = actor(Role::CollegeAdmin, Some("CMPICA"), None);
        let record = pending(Role::Professor, Some("cmpica"), None);
        assert!(can_approve(&college_admin, None, &record));
    }

    #[test]
    fn scenario_d_collegeadmin_never_approves_collegeadmin() {
        let college_admin = actor(Role::CollegeAdmin, Some("cmpica"), None);
        let record = pending(Role::CollegeAdmin, Some("cmpica"), None);
        assert!(!can_approve(&college_admin, None, &record));
    }

    #[test]
    fn collegeadmin_stays_in_department() {
        let college_admin = actor(Role::CollegeAdmin, Some("cmpica"), None);
        assert!(!can_approve(
            &college_admin,
            None,
            &pending(Role::Student, Some("cspit"), Some("ce"))
        ));
        assert!(!can_approve(
            &college_admin,
            None,
            &pending(Role::Alumni, None, Some("mca"))
        ));
    }

    #[test]
    fn admin_approves_anyone() {
        let admin = actor(Role::Admin, None, None);
        let college_admin = pending(Role::CollegeAdmin, Some("cspit"), None);
        let legacy_alumni = pending(Role::Alumni, None, None);
        assert!(can_approve(&admin, None, &college_admin));
        assert!(can_approve(&admin, None, &legacy_alumni));
    }

    #[test]
    fn branch_manager_approves_matching_student() {
        let professor = actor(Role::Professor, Some("cmpica"), Some("mca"));
        let grant = manager_grant(&professor, true);
        let record = pending(Role::Student, Some("CMPICA"), Some("mca"));
        assert!(can_approve(&professor, Some(&grant), &record));
    }

    #[test]
    fn professor_without_grant_never_approves() {
        let professor = actor(Role::Professor, Some("cmpica"), Some("mca"));
        let record = pending(Role::Student, Some("cmpica"), Some("mca"));
        assert!(!can_approve(&professor, None, &record));
        assert!(!can_approve(&professor, Some(&manager_grant(&professor, false)), &record));
    }

    #[test]
    fn professor_cannot_borrow_another_grant() {
        let professor = actor(Role::Professor, Some("cmpica"), Some("mca"));
        let colleague = actor(Role::Professor, Some("cmpica"), Some("mca"));
        let record = pending(Role::Student, Some("cmpica"), Some("mca"));
        let borrowed = manager_grant(&colleague, true);
        assert!(!can_approve(&professor, Some(&borrowed), &record));
    }

    #[test]
    fn branch_manager_requires_exact_branch_and_student_role() {
        let professor = actor(Role::Professor, Some("cmpica"), Some("mca"));
        let grant = manager_grant(&professor, true);
        let refused = [
            pending(Role::Student, Some("cmpica"), Some("bca")),
            pending(Role::Student, Some("cmpica"), None),
            pending(Role::Student, None, Some("mca")),
            pending(Role::Alumni, Some("cmpica"), Some("mca")),
        ];

        for record in &refused {
            assert!(!can_approve(&professor, Some(&grant), record));
        }
    }

    #[test]
    fn authority_outlives_pending_state() {
        let admin = actor(Role::Admin, None, None);
        let student = actor(Role::Student, Some("cmpica"), Some("mca"));
        let mut record = pending(Role::Alumni, Some("cmpica"), Some("mca"));
        assert!(record.resolve(ApprovalDecision::Approve, admin.id(), now()).is_ok());

        assert!(!can_approve(&admin, None, &record));
        assert!(has_approval_authority(&admin, None, &record));
        assert!(!has_approval_authority(&student, None, &record));
    }

    #[test]
    fn resolution_is_monotonic() {
        let admin = actor(Role::Admin, None, None);
        let mut record = pending(Role::Student, Some("cmpica"), Some("mca"));

        assert!(record.resolve(ApprovalDecision::Approve, admin.id(), now()).is_ok());
        let resolved = record.clone();

        let second = record.resolve(ApprovalDecision::Reject, admin.id(), now());
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(record, resolved);
        assert_eq!(record.status(), ApprovalStatus::Approved);
        assert!(!can_approve(&admin, None, &record));
    }

    #[test]
    fn grant_toggles_both_flags() {
        let professor = actor(Role::Professor, Some("cmpica"), Some("mca"));
        let granted = manager_grant(&professor, true);
        assert!(granted.is_branch_manager() && granted.can_approve_students());
        let revoked = manager_grant(&professor, false);
        assert!(!revoked.is_branch_manager() && !revoked.can_approve_students());
    }

    #[test]
    fn branch_manager_assignment_rules() {
        let admin = actor(Role::Admin, None, None);
        let college_admin = actor(Role::CollegeAdmin, Some("CMPICA"), None);
        let professor = actor(Role::Professor, Some("cmpica"), Some("mca"));
        let foreign_professor = actor(Role::Professor, Some("cspit"), Some("ce"));
        let student = actor(Role::Student, Some("cmpica"), Some("mca"));

        assert!(can_manage_branch_manager(&admin, &foreign_professor));
        assert!(can_manage_branch_manager(&college_admin, &professor));
        assert!(!can_manage_branch_manager(&college_admin, &foreign_professor));
        assert!(!can_manage_branch_manager(&college_admin, &student));
        assert!(!can_manage_branch_manager(&professor, &professor));
    }

    proptest! {
        #[test]
        fn branch_approval_requires_grant_department_and_branch(
            enabled in any::<bool>(),
            professor_department in "[a-z]{2,4}",
            professor_branch in "[a-z]{2,4}",
            student_department in "[a-z]{2,4}",
            student_branch in "[a-z]{2,4}",
        ) {
            let professor = actor(
                Role::Professor,
                Some(&professor_department),
                Some(&professor_branch),
            );
            let grant = manager_grant(&professor, enabled);
            let record = pending(Role::Student, Some(&student_department), Some(&student_branch));

            let expected = enabled
                && professor_department == student_department
                && professor_branch == student_branch;
            prop_assert_eq!(can_approve(&professor, Some(&grant), &record), expected);
        }
    }
}
