//! Local authentication helpers: access tokens and password hashes.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, decode_token, issue_token};
