use anyhow::{anyhow, Result};
use log::debug;
use reqwest::Method;
use serde_json::Value;
use woocommerce_tools::{WooApi, WooConfig};

use crate::RequestParams;

pub async fn run_request(config: WooConfig, params: RequestParams) -> Result<()> {
    let method = parse_method(&params.method)?;
    let body = params
        .data
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| anyhow!("The request body is not valid JSON. {e}"))?;
    let query = params.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>();
    let api = WooApi::new(config)?;
    debug!("Sending {method} {} using {} authentication", params.endpoint, api.auth_mode());
    let response = api.request(method, &params.endpoint, &query, body.as_ref()).await?;
    let status = response.status();
    let text = response.text().await?;
    println!("{status}");
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    if !status.is_success() {
        return Err(anyhow!("The store responded with {status}"));
    }
    Ok(())
}

fn parse_method(method: &str) -> Result<Method> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        "OPTIONS" => Ok(Method::OPTIONS),
        m => Err(anyhow!("Unsupported method: {m}")),
    }
}
