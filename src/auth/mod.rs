//! Accounts: who is logged in, what they own, and password storage.

pub mod authorization;
pub mod password;

pub use authorization::{current_user, current_user_id, is_authenticated, is_owner, SessionUser, USER_KEY};
pub use password::{hash_password, verify_login, verify_password};
