//! Core business logic - framework-agnostic operations over the local store.
//!
//! Every function takes a sea-orm connection (or transaction) and returns the
//! crate [`Result`](crate::errors::Result). Nothing in here knows about HTTP.

pub mod field;
pub mod machine;
pub mod mirror;
pub mod scheduler_run;
pub mod sync;
pub mod user;
pub mod work_plan;
