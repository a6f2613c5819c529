//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod post_repo;
pub mod review_repo;
pub mod user_repo;

pub use post_repo::PostRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
