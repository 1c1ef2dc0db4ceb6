//! # OAuth1.0a-style request signing
//!
//! WooCommerce will not accept Basic Auth over plaintext HTTP. Instead, every request carries a signature in its
//! query string, computed from the request itself and the consumer secret. The server reconstructs the same canonical
//! string from what it receives and checks the signature against it.
//!
//! The scheme is modelled on RFC 5849, but it is single-legged (no token exchange) and uses HMAC-SHA256.
//!
//! ## Signature format
//!
//! The signed parameter set is the URL's own query parameters, plus
//!   * `oauth_consumer_key`: the consumer key,
//!   * `oauth_timestamp`: seconds since the Unix epoch,
//!   * `oauth_nonce`: a single-use random token (see [`crate::nonce`]),
//!   * `oauth_signature_method`: always `HMAC-SHA256`.
//!
//! The parameters are sorted by key, percent-encoded and joined into the _parameter string_:
//!
//! ```text
//!    k1=v1&k2=v2&...
//! ```
//!
//! The _signature base string_ is then
//!
//! ```text
//!    {METHOD}&{percent_encode(base_url)}&{percent_encode(parameter_string)}
//! ```
//!
//! where `base_url` is the normalized request URL without its query string or fragment. The signing key is the
//! consumer secret followed by `&`, except for API versions `v1` and `v2`, which use the bare secret. The signature is
//! the standard, padded base64 encoding of `HMAC-SHA256(signing_key, base_string)`, and is added to the query string
//! as `oauth_signature`.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;
use url::Url;
use woo_common::Secret;

use crate::{
    helpers::{encode_query, percent_encode},
    nonce::{generate_nonce, NonceStrategy},
    WooApiError,
};

pub type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA256";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";

// API versions whose signing key is the bare consumer secret, without the trailing `&`.
const BARE_KEY_VERSIONS: [&str; 2] = ["v1", "v2"];

/// The consumer key/secret pair issued by the store.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: Secret<String>,
}

impl Credentials {
    pub fn new<K: Into<String>, S: Into<String>>(consumer_key: K, consumer_secret: S) -> Self {
        Self { consumer_key: consumer_key.into(), consumer_secret: Secret::new(consumer_secret.into()) }
    }
}

/// Produces OAuth-signed request URLs for a fixed set of credentials and API version.
///
/// The builder holds no mutable state, so a single instance can sign requests from many tasks at once.
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    credentials: Credentials,
    version: String,
    nonce_strategy: NonceStrategy,
}

impl SignatureBuilder {
    pub fn new(credentials: Credentials, version: &str) -> Self {
        Self { credentials, version: version.to_string(), nonce_strategy: NonceStrategy::default() }
    }

    pub fn with_nonce_strategy(mut self, nonce_strategy: NonceStrategy) -> Self {
        self.nonce_strategy = nonce_strategy;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sign a request to `url` with a freshly generated nonce and return the signed URL.
    ///
    /// `params` are added to whatever query parameters `url` already carries. See [`Self::sign_with_nonce`].
    pub fn sign(
        &self,
        url: &str,
        method: &str,
        params: &[(&str, &str)],
        timestamp: i64,
    ) -> Result<String, WooApiError> {
        let nonce = generate_nonce(self.nonce_strategy);
        self.sign_with_nonce(url, method, params, timestamp, &nonce)
    }

    /// Sign a request to `url` using the given nonce and return the signed URL.
    ///
    /// If the URL has repeated query parameters, the first value wins. Entries in `params` overwrite URL parameters
    /// with the same name, and the `oauth_*` protocol parameters overwrite both.
    pub fn sign_with_nonce(
        &self,
        url: &str,
        method: &str,
        params: &[(&str, &str)],
        timestamp: i64,
        nonce: &str,
    ) -> Result<String, WooApiError> {
        let (base_url, mut working) = split_url(url)?;
        for (k, v) in params {
            working.insert(k.to_string(), v.to_string());
        }
        working.insert(OAUTH_CONSUMER_KEY.to_string(), self.credentials.consumer_key.clone());
        working.insert(OAUTH_TIMESTAMP.to_string(), timestamp.to_string());
        working.insert(OAUTH_NONCE.to_string(), nonce.to_string());
        working.insert(OAUTH_SIGNATURE_METHOD.to_string(), SIGNATURE_METHOD.to_string());
        working.remove(OAUTH_SIGNATURE);
        let signature = self.signature(method, &base_url, &working)?;
        working.insert(OAUTH_SIGNATURE.to_string(), signature);
        trace!("Signed {} request for {base_url} at {timestamp}", method.to_ascii_uppercase());
        Ok(format!("{base_url}?{}", encode_query(&working)))
    }

    /// Compute the signature over `params`. Any `oauth_signature` entry in `params` is ignored.
    pub fn signature(
        &self,
        method: &str,
        base_url: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, WooApiError> {
        let base_string = signature_base_string(method, base_url, params);
        let mac = self.keyed_mac(&base_string)?;
        Ok(base64::encode(mac.finalize().into_bytes()))
    }

    /// An HMAC keyed with this builder's signing key, already fed with `base_string`.
    pub(crate) fn keyed_mac(&self, base_string: &str) -> Result<HmacSha256, WooApiError> {
        let secret = self.credentials.consumer_secret.reveal();
        if secret.is_empty() {
            return Err(WooApiError::SigningFailure("The consumer secret is empty".to_string()));
        }
        let key = signing_key(secret, &self.version);
        let mut mac =
            HmacSha256::new_from_slice(key.reveal()).map_err(|e| WooApiError::SigningFailure(e.to_string()))?;
        mac.update(base_string.as_bytes());
        Ok(mac)
    }
}

/// Split `url` into its normalized base URL (no query, no fragment) and its query parameters.
///
/// The base URL is serialized exactly as it goes out on the wire (lowercase host, no default port, percent-encoded
/// path), so the signer and a verifier reading the received request agree on it. The first value wins for repeated
/// keys.
pub fn split_url(url: &str) -> Result<(String, BTreeMap<String, String>), WooApiError> {
    let mut parsed = Url::parse(url).map_err(|e| WooApiError::InvalidUrl(e.to_string()))?;
    let mut params = BTreeMap::new();
    for (k, v) in parsed.query_pairs() {
        params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok((parsed.as_str().to_string(), params))
}

/// The sorted, percent-encoded `key=value&...` string. `oauth_signature` is never part of it.
pub fn parameter_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(k, _)| k.as_str() != OAUTH_SIGNATURE)
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<String>>()
        .join("&")
}

/// `METHOD&encoded(base_url)&encoded(parameter_string)`
pub fn signature_base_string(method: &str, base_url: &str, params: &BTreeMap<String, String>) -> String {
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(&parameter_string(params))
    )
}

/// The HMAC key: the consumer secret, followed by `&` unless `version` is `v1` or `v2`.
pub fn signing_key(consumer_secret: &str, version: &str) -> Secret<Vec<u8>> {
    let mut key = consumer_secret.as_bytes().to_vec();
    if !BARE_KEY_VERSIONS.contains(&version) {
        key.push(b'&');
    }
    Secret::new(key)
}
