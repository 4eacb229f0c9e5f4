//! Encryption and decryption pipelines
//!
//! Stateless per call: the only shared piece is the service handle passed in.

pub mod decrypt_order;
pub mod encrypt_order;
pub mod portfolio;
pub mod session;

pub use decrypt_order::*;
pub use encrypt_order::*;
pub use portfolio::*;
pub use session::DecryptionContext;
