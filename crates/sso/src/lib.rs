//! Relying-party side of a single-provider SSO integration.
//!
//! [`SsoClient`] builds the provider login redirect, pulls the bearer token out
//! of the callback query, and fetches the signed-in user's profile. How the
//! token is kept between requests (cookie, browser storage) is left to the
//! caller.

mod client;
mod config;
mod error;
mod profile;
mod token;

pub use client::SsoClient;
pub use config::{ConfigError, ProviderConfig};
pub use error::{MissingTokenError, ProfileFetchError};
pub use profile::UserProfile;
pub use token::SessionToken;
