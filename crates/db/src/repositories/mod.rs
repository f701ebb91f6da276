//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an open transaction) as the first argument.

pub mod issue_repo;
pub mod user_repo;

pub use issue_repo::IssueRepo;
pub use user_repo::UserRepo;
