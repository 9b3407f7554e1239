//! Credential hashing for user accounts.

pub mod crypto;

pub use crypto::{AuthCrypto, AuthCryptoError};
