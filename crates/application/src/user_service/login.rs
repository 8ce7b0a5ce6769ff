use super::*;

impl UserService {
    /// Authenticates an account with email and password.
    ///
    /// Unknown emails and wrong passwords both yield `AuthOutcome::Failed`.
    /// Approval state is only revealed once the password checks out.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let normalized_email = email.trim().to_lowercase();
        let user = self.user_repository.find_by_email(&normalized_email).await?;

        let Some(user) = user else {
            // Always hash so unknown accounts cost the same as known ones.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        let password_valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)?;

        if !password_valid {
            return Ok(AuthOutcome::Failed);
        }

        Ok(match user.approval_status {
            ApprovalStatus::Approved => AuthOutcome::Authenticated(user),
            ApprovalStatus::Pending => AuthOutcome::PendingApproval,
            ApprovalStatus::Rejected => AuthOutcome::Rejected,
        })
    }
}
