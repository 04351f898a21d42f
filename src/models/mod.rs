//! Data models
//!
//! Entities stored by the backend (User, Session, Place, Post, Checklist)
//! together with the request inputs and response shapes built from them.

mod checklist;
mod place;
mod post;
mod session;
mod user;

pub use checklist::{Checklist, ChecklistItem, ChecklistView};
pub use place::{
    CreatePlaceInput, Location, Place, PlaceCategory, PlaceListing, PlaceRanking, Rankings,
    UpdatePlaceInput,
};
pub use post::{CreatePostInput, LikeInput, Post, PostWithAuthor, UpdatePostInput};
pub use session::Session;
pub use user::{LoginInput, RegisterInput, UpdateUserInput, User, UserRole};
