//! Wire types exchanged with the search and reasoning services.

pub mod candidate;
pub mod request;
pub mod skeleton;
