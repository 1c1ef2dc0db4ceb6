use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
    Method,
    Request,
    Response,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{auth::AuthMode, config::WooConfig, helpers::encode_query, oauth::SignatureBuilder, WooApiError};

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

#[derive(Clone)]
pub struct WooApi {
    config: WooConfig,
    signer: SignatureBuilder,
    client: Arc<Client>,
}

impl WooApi {
    pub fn new(config: WooConfig) -> Result<Self, WooApiError> {
        let auth_mode = config.auth_mode();
        if auth_mode.requires_tls() && !config.is_ssl() {
            return Err(WooApiError::InsecureTransport(auth_mode.to_string()));
        }
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| WooApiError::Initialization(e.to_string()))?;
        debug!("WooCommerce client for {} will use {auth_mode} authentication", config.url);
        let signer = config.signature_builder();
        Ok(Self { config, signer, client: Arc::new(client) })
    }

    pub fn config(&self) -> &WooConfig {
        &self.config
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.config.auth_mode()
    }

    /// The full URL for an API endpoint, e.g. `products/42` becomes
    /// `https://shop.example.com/wp-json/wc/v3/products/42`.
    pub fn url(&self, endpoint: &str) -> String {
        let api_path = if self.config.wp_api { "wp-json" } else { "wc-api" };
        let base = self.config.url.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        format!("{base}/{api_path}/{}/{endpoint}", self.config.version)
    }

    /// Build an authenticated request for `endpoint` without sending it.
    pub fn build_request<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Request, WooApiError> {
        let url = self.url(endpoint);
        let mode = self.auth_mode();
        let target = match mode {
            AuthMode::BasicAuth => with_query(&url, params, &[]),
            AuthMode::QueryStringCredentials => with_query(
                &url,
                params,
                &[
                    ("consumer_key", self.config.consumer_key.as_str()),
                    ("consumer_secret", self.config.consumer_secret.reveal().as_str()),
                ],
            ),
            AuthMode::OAuthSigned => {
                let timestamp = Utc::now().timestamp();
                self.signer.sign(&url, method.as_str(), params, timestamp)?
            },
        };
        let target = Url::parse(&target).map_err(|e| WooApiError::InvalidUrl(format!("{url}: {e}")))?;
        trace!("Building {method} request for {url} ({mode})");
        let mut req = self.client.request(method, target);
        if mode == AuthMode::BasicAuth {
            req = req.basic_auth(&self.config.consumer_key, Some(self.config.consumer_secret.reveal()));
        }
        if let Some(body) = body {
            let json = serde_json::to_vec(body).map_err(|e| WooApiError::JsonError(e.to_string()))?;
            req = req.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(json);
        }
        req.build().map_err(|e| WooApiError::RestRequestError(e.to_string()))
    }

    /// Send an authenticated request and return the raw response, whatever its status.
    pub async fn request<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response, WooApiError> {
        let req = self.build_request(method, endpoint, params, body)?;
        let response =
            self.client.execute(req).await.map_err(|e| WooApiError::RestResponseError(e.to_string()))?;
        trace!("{endpoint} responded with {}", response.status());
        Ok(response)
    }

    /// Send an authenticated request and deserialize the JSON response. Non-2xx responses become
    /// [`WooApiError::QueryError`].
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, WooApiError> {
        let response = self.request(method, endpoint, params, body).await?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| WooApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| WooApiError::RestResponseError(e.to_string()))?;
            warn!("REST query to {endpoint} failed with status {status}");
            Err(WooApiError::QueryError { status, message })
        }
    }

    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response, WooApiError> {
        self.request::<()>(Method::GET, endpoint, params, None).await
    }

    pub async fn post<B: Serialize>(
        &self,
        endpoint: &str,
        data: &B,
        params: &[(&str, &str)],
    ) -> Result<Response, WooApiError> {
        self.request(Method::POST, endpoint, params, Some(data)).await
    }

    pub async fn put<B: Serialize>(
        &self,
        endpoint: &str,
        data: &B,
        params: &[(&str, &str)],
    ) -> Result<Response, WooApiError> {
        self.request(Method::PUT, endpoint, params, Some(data)).await
    }

    pub async fn delete(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response, WooApiError> {
        self.request::<()>(Method::DELETE, endpoint, params, None).await
    }

    pub async fn options(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response, WooApiError> {
        self.request::<()>(Method::OPTIONS, endpoint, params, None).await
    }
}

// Later entries overwrite earlier ones, so `extra` wins over `params`.
fn with_query(url: &str, params: &[(&str, &str)], extra: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .chain(extra.iter())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<String, String>>();
    if query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{}", encode_query(&query))
    }
}
