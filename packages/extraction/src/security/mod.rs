//! Secret handling for service credentials.

pub mod credentials;

pub use credentials::SecretString;
