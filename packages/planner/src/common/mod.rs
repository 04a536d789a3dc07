pub mod geo;
pub mod id;
pub mod text;

pub use geo::{Coordinates, WalkingModel};
pub use id::Id;
pub use text::{locations_overlap, normalize_name, truncate_chars};
