mod api;
mod auth;
mod config;
mod error;
mod helpers;
pub mod nonce;
pub mod oauth;
mod verifier;

pub use api::WooApi;
pub use auth::AuthMode;
pub use config::{default_user_agent, WooConfig, DEFAULT_API_VERSION, DEFAULT_TIMEOUT};
pub use error::WooApiError;
pub use helpers::{encode_query, percent_encode};
pub use nonce::{generate_nonce, NonceStrategy};
pub use oauth::{Credentials, SignatureBuilder};
pub use verifier::verify_signed_url;
