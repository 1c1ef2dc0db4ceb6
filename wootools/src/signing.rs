use anyhow::{anyhow, Result};
use chrono::Utc;
use woocommerce_tools::{verify_signed_url, WooConfig};

use crate::{SignParams, VerifyParams};

pub fn print_signed_url(config: &WooConfig, params: SignParams) -> Result<()> {
    let builder = config.signature_builder();
    let timestamp = params.timestamp.unwrap_or_else(|| Utc::now().timestamp());
    let extra = params.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>();
    let url = match &params.nonce {
        Some(nonce) => builder.sign_with_nonce(&params.url, &params.method, &extra, timestamp, nonce),
        None => builder.sign(&params.url, &params.method, &extra, timestamp),
    }
    .map_err(|e| anyhow!("Could not sign the URL. {e}"))?;
    println!("----------------------------- Signed URL -----------------------------");
    println!("Method    : {}", params.method.to_ascii_uppercase());
    println!("Version   : {}", builder.version());
    println!("Timestamp : {timestamp}");
    println!("{url}");
    println!("----------------------------------------------------------------------");
    Ok(())
}

pub fn print_verification(config: &WooConfig, params: VerifyParams) -> Result<()> {
    verify_signed_url(&params.url, &params.method, &config.credentials(), &config.version)
        .map_err(|e| anyhow!("❌️ {e}"))?;
    println!("✅️ The signature is valid");
    Ok(())
}
