//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument.

pub mod comment_repo;
pub mod project_repo;

pub use comment_repo::CommentRepo;
pub use project_repo::ProjectRepo;
