//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod checklist;
pub mod place;
pub mod post;
pub mod session;
pub mod user;

pub use checklist::{ChecklistRepository, SqlxChecklistRepository};
pub use place::{PlaceRepository, SqlxPlaceRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
