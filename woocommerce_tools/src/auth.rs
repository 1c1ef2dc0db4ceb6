use std::{fmt::Display, str::FromStr};

use crate::WooApiError;

/// How credentials are attached to an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Basic` header. TLS only.
    BasicAuth,
    /// `consumer_key` and `consumer_secret` as plaintext query parameters. TLS only, and weaker than Basic Auth since
    /// the secret ends up in server and proxy access logs.
    QueryStringCredentials,
    /// OAuth1.0a-style signed query string. Used when the store is served over plain HTTP.
    OAuthSigned,
}

impl AuthMode {
    /// Pick the mode the store expects for the given transport.
    pub fn select(is_ssl: bool, query_string_auth: bool) -> Self {
        match (is_ssl, query_string_auth) {
            (true, false) => Self::BasicAuth,
            (true, true) => Self::QueryStringCredentials,
            (false, _) => Self::OAuthSigned,
        }
    }

    pub fn requires_tls(&self) -> bool {
        !matches!(self, Self::OAuthSigned)
    }
}

impl Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BasicAuth => write!(f, "basic"),
            Self::QueryStringCredentials => write!(f, "query_string"),
            Self::OAuthSigned => write!(f, "oauth"),
        }
    }
}

impl FromStr for AuthMode {
    type Err = WooApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "basic_auth" => Ok(Self::BasicAuth),
            "query_string" | "query" => Ok(Self::QueryStringCredentials),
            "oauth" | "oauth1" => Ok(Self::OAuthSigned),
            _ => Err(WooApiError::Initialization(format!("Unknown authentication mode: {s}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn selection_follows_transport() {
        assert_eq!(AuthMode::select(true, false), AuthMode::BasicAuth);
        assert_eq!(AuthMode::select(true, true), AuthMode::QueryStringCredentials);
        assert_eq!(AuthMode::select(false, false), AuthMode::OAuthSigned);
        assert_eq!(AuthMode::select(false, true), AuthMode::OAuthSigned);
    }

    #[test]
    fn only_oauth_works_without_tls() {
        assert!(AuthMode::BasicAuth.requires_tls());
        assert!(AuthMode::QueryStringCredentials.requires_tls());
        assert!(!AuthMode::OAuthSigned.requires_tls());
    }

    #[test]
    fn parse_round_trips_display() {
        for mode in [AuthMode::BasicAuth, AuthMode::QueryStringCredentials, AuthMode::OAuthSigned] {
            assert_eq!(mode.to_string().parse::<AuthMode>().unwrap(), mode);
        }
        assert!("kerberos".parse::<AuthMode>().is_err());
    }
}
