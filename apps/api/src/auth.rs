//! Session-backed authentication handlers.

mod bootstrap;
mod password;
mod session;

pub use bootstrap::bootstrap_handler;
pub use password::{login_handler, register_handler};
pub use session::{logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
