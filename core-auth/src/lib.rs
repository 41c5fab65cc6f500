//! # Authentication Module
//!
//! Credentials for the remote subtitle service.
//!
//! ## Overview
//!
//! Every request the uploader makes carries a bearer token, and every entity
//! it creates is stamped with the id of the account that owns it. Both come
//! from an [`AuthData`] obtained once from a [`TokenProvider`] when the
//! uploader is built.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{AuthError, Result};
pub use provider::{FileTokenProvider, StaticTokenProvider, TokenProvider};
pub use types::{AuthData, IdRepr, UserId};
