//! Authentication utilities library
//!
//! Provides the credential primitives the auth service is built on:
//! - Password hashing (Argon2id, tunable work factor, constant-time verify)
//! - Opaque bearer tokens (16 random bytes, standard base64 text form)
//!
//! Nothing here performs I/O; persistence and expiry belong to the service.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Bearer Tokens
//! ```
//! use auth::Token;
//!
//! let token = Token::generate().unwrap();
//! let text = token.encode();
//! let decoded = Token::decode(&text).unwrap();
//! assert_eq!(decoded, token);
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Token;
pub use token::TokenError;
