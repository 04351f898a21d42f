//! Services layer - Business logic
//!
//! Services validate input, apply the domain rules (checklist merging,
//! rankings, like toggling, account checks) and talk to the repositories.

pub mod checklist;
pub mod locks;
pub mod password;
pub mod place;
pub mod post;
pub mod ranking;
pub mod user;

pub use checklist::{ChecklistService, ChecklistServiceError};
pub use password::{hash_password, verify_password};
pub use place::{PlaceService, PlaceServiceError};
pub use post::{LikeState, PostService, PostServiceError};
pub use ranking::compute_rankings;
pub use user::{AuthSession, UserService, UserServiceError};
