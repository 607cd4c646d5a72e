//! Wire types for the nutrition-tracker API.
//!
//! - `UserProfile`: the authenticated user's account and body metrics
//! - `Food`, `FoodCreate`: the user's food catalog
//! - `TrackerEntry`, `TrackerEntryCreate`: daily nutrition totals

pub mod food;
pub mod tracker;
pub mod user;

pub use food::{Food, FoodCreate};
pub use tracker::{TrackerEntry, TrackerEntryCreate};
pub use user::UserProfile;
