//! Identity backend providers.
//!
//! Two contracts, [`authn::AuthnProvider`] and [`user::UserProvider`], each with a local implementation that
//! delegates to the platform's user store and a REST implementation that talks to an external identity service.
//! Both report failures as [`ProviderError`].

pub mod authn;
pub mod config;
pub mod error;
pub mod init;
pub mod service;
pub mod user;

mod de;
mod rest;
#[cfg(test)]
mod test_utils;

pub use error::{ErrorCode, ProviderError};
