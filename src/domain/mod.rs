//! Domain keys and their productivity classes. Every component goes through [normalize] before
//! touching a ledger map, so write-time and read-time keys always agree.

pub mod category;
pub mod normalize;

pub use category::{Category, CategoryClassifier, CategoryOverrides};
pub use normalize::normalize;
