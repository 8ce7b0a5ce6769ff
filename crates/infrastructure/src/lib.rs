//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod postgres_approval_repository;
mod postgres_audit_repository;
mod postgres_content_repository;
mod postgres_user_repository;
mod view_filter_sql;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use postgres_approval_repository::PostgresApprovalRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_content_repository::PostgresContentRepository;
pub use postgres_user_repository::PostgresUserRepository;
