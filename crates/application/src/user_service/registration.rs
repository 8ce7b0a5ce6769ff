use alumnet_domain::{ApprovalDecision, EmailAddress, validate_password};

use super::*;

impl UserService {
    /// Registers a new account and queues it for approval.
    ///
    /// The department claim is required for every self-registrable role and
    /// the branch claim for students and alumni.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserId> {
        if !params.role.is_self_registrable() {
            return Err(AppError::Forbidden(format!(
                "{} accounts cannot self-register",
                params.role
            )));
        }

        let (department, branch) =
            require_scope_for_role(params.role, params.department, params.branch)?;

        let created_at = Utc::now();
        let user = self
            .new_user_record(
                &params.email,
                &params.password,
                &params.display_name,
                params.role,
                department,
                branch,
                created_at,
            )
            .await?;

        let approval = ApprovalRecord::pending(
            user.id,
            user.role,
            user.department.clone(),
            user.branch.clone(),
            created_at,
        );
        let user_id = user.id;
        self.user_repository.create(user, approval).await?;

        Ok(user_id)
    }

    /// Creates the first administrator.
    ///
    /// Refused once any administrator exists. The approval record is created
    /// already approved by the new account itself.
    pub async fn bootstrap_admin(&self, params: BootstrapAdminParams) -> AppResult<UserRecord> {
        if self.user_repository.admin_exists().await? {
            return Err(AppError::Conflict(
                "an administrator already exists".to_owned(),
            ));
        }

        let created_at = Utc::now();
        let user = self
            .new_user_record(
                &params.email,
                &params.password,
                &params.display_name,
                Role::Admin,
                None,
                None,
                created_at,
            )
            .await?;

        let mut approval = ApprovalRecord::pending(user.id, Role::Admin, None, None, created_at);
        approval.resolve(ApprovalDecision::Approve, user.id, created_at)?;

        let user_id = user.id;
        self.user_repository.create(user, approval).await?;

        let actor = Actor::new(user_id, Role::Admin, None, None);
        self.audit(&actor, AuditAction::AdminBootstrapped, user_id, None)
            .await?;

        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Internal("bootstrapped administrator vanished".to_owned()))
    }

    #[allow(clippy::too_many_arguments)]
    async fn new_user_record(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
        created_at: DateTime<Utc>,
    ) -> AppResult<NewUserRecord> {
        let email_address = EmailAddress::new(email)?;
        validate_password(password)?;

        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation(
                "display name must not be empty".to_owned(),
            ));
        }

        // Check for existing user -- always hash to prevent timing attacks.
        let existing = self
            .user_repository
            .find_by_email(email_address.as_str())
            .await?;

        if existing.is_some() {
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Conflict(
                "an account with this email address already exists".to_owned(),
            ));
        }

        let password_hash = self.password_hasher.hash_password(password)?;

        Ok(NewUserRecord {
            id: UserId::new(),
            email: email_address.as_str().to_owned(),
            display_name: display_name.to_owned(),
            password_hash,
            role,
            department,
            branch,
            created_at,
        })
    }
}
