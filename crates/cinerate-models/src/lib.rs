pub mod ids;
pub mod movie;
pub mod review;
pub mod likes;
pub mod rating;
pub mod validation;

pub use ids::{MovieId, ReviewId, UserId};
pub use movie::{Movie, MovieDraft};
pub use review::{Review, ReviewDraft};
pub use likes::LikeSet;
pub use rating::{RatingSummary, Stars};
pub use validation::{FieldError, ValidationErrors};
