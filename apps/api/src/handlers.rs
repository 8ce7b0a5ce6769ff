pub mod approvals;
pub mod content;
pub mod health;
pub mod users;
