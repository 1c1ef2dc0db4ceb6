use std::{env, time::Duration};

use log::*;
use woo_common::{env_flag, Secret};

use crate::{
    auth::AuthMode,
    nonce::NonceStrategy,
    oauth::{Credentials, SignatureBuilder},
};

pub const DEFAULT_API_VERSION: &str = "wc/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct WooConfig {
    /// The store's base URL, e.g. "https://shop.example.com"
    pub url: String,
    pub consumer_key: String,
    pub consumer_secret: Secret<String>,
    /// The API version tag, e.g. "wc/v3". Also selects the OAuth signing key variant.
    pub version: String,
    /// When true, requests go to the `/wp-json` REST API. When false, the legacy `/wc-api` path is used.
    pub wp_api: bool,
    pub timeout: Duration,
    /// **DANGER** If false, TLS certificates are not verified.
    pub verify_ssl: bool,
    /// Send credentials as plaintext query parameters instead of a Basic Auth header. Only applies over TLS.
    pub query_string_auth: bool,
    pub user_agent: String,
    /// Overrides the automatically selected authentication mode.
    pub auth_mode: Option<AuthMode>,
    pub nonce_strategy: NonceStrategy,
}

impl Default for WooConfig {
    fn default() -> Self {
        Self {
            url: String::default(),
            consumer_key: String::default(),
            consumer_secret: Secret::default(),
            version: DEFAULT_API_VERSION.to_string(),
            wp_api: true,
            timeout: DEFAULT_TIMEOUT,
            verify_ssl: true,
            query_string_auth: false,
            user_agent: default_user_agent(),
            auth_mode: None,
            nonce_strategy: NonceStrategy::default(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("WooCommerce-Rust-REST-API/{}", env!("CARGO_PKG_VERSION"))
}

impl WooConfig {
    pub fn new(url: &str, consumer_key: &str, consumer_secret: &str) -> Self {
        Self {
            url: url.to_string(),
            consumer_key: consumer_key.to_string(),
            consumer_secret: Secret::new(consumer_secret.to_string()),
            ..Default::default()
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let url = env::var("WOO_STORE_URL").unwrap_or_else(|_| {
            warn!("WOO_STORE_URL not set, using (probably useless) default");
            "http://localhost".to_string()
        });
        let consumer_key = env::var("WOO_CONSUMER_KEY").unwrap_or_else(|_| {
            warn!("WOO_CONSUMER_KEY not set. Requests will not authenticate.");
            String::default()
        });
        let consumer_secret = Secret::new(env::var("WOO_CONSUMER_SECRET").unwrap_or_else(|_| {
            warn!("WOO_CONSUMER_SECRET not set. Requests will not authenticate.");
            String::default()
        }));
        let version = env::var("WOO_API_VERSION").unwrap_or_else(|_| {
            info!("WOO_API_VERSION not set, using {DEFAULT_API_VERSION} as default");
            DEFAULT_API_VERSION.to_string()
        });
        let timeout = env::var("WOO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| {
                        warn!("{s} is not a valid value for WOO_TIMEOUT_SECS. {e} Using the default instead.");
                    })
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let auth_mode = env::var("WOO_AUTH_MODE").ok().and_then(|s| {
            s.parse::<AuthMode>()
                .map_err(|e| warn!("{e}. The authentication mode will be selected automatically."))
                .ok()
        });
        let nonce_strategy =
            if env_flag("WOO_LEGACY_NONCE", false) { NonceStrategy::DecimalBytes } else { NonceStrategy::Random };
        let verify_ssl = env_flag("WOO_VERIFY_SSL", true);
        if !verify_ssl {
            warn!("🚨️ TLS certificate verification is disabled. Do not use this against a production store.");
        }
        Self {
            url,
            consumer_key,
            consumer_secret,
            version,
            wp_api: env_flag("WOO_WP_API", true),
            timeout,
            verify_ssl,
            query_string_auth: env_flag("WOO_QUERY_STRING_AUTH", false),
            user_agent: env::var("WOO_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            auth_mode,
            nonce_strategy,
        }
    }

    pub fn is_ssl(&self) -> bool {
        self.url.starts_with("https")
    }

    /// The configured authentication mode, or the one implied by the store URL's scheme.
    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode.unwrap_or_else(|| AuthMode::select(self.is_ssl(), self.query_string_auth))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials { consumer_key: self.consumer_key.clone(), consumer_secret: self.consumer_secret.clone() }
    }

    pub fn signature_builder(&self) -> SignatureBuilder {
        SignatureBuilder::new(self.credentials(), &self.version).with_nonce_strategy(self.nonce_strategy)
    }
}
