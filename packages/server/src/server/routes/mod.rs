// HTTP routes
pub mod discover;
pub mod health;
pub mod itineraries;

pub use discover::*;
pub use health::*;
pub use itineraries::*;
