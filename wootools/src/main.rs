use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use woocommerce_tools::WooConfig;

mod request;
mod signing;

use crate::{
    request::run_request,
    signing::{print_signed_url, print_verification},
};

#[derive(Parser, Debug)]
#[command(version, about = "Sign and send WooCommerce REST API requests")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "sign", about = "Print an OAuth-signed URL using the configured credentials")]
    Sign(SignParams),
    #[clap(name = "verify", about = "Check the signature of an OAuth-signed URL against the configured credentials")]
    Verify(VerifyParams),
    #[clap(name = "request", about = "Send a request to the store and print the response")]
    Request(RequestParams),
}

#[derive(Debug, Args)]
pub struct SignParams {
    /// The full request URL, including any query parameters
    #[arg(short = 'u', long = "url")]
    url: String,
    #[arg(short = 'm', long = "method", default_value = "GET")]
    method: String,
    /// Seconds since the Unix epoch. Defaults to now.
    #[arg(short = 't', long = "timestamp")]
    timestamp: Option<i64>,
    /// Use a fixed nonce instead of a random one. Only useful for reproducing a signature.
    #[arg(short = 'n', long = "nonce")]
    nonce: Option<String>,
    /// Extra query parameters, as key=value
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct VerifyParams {
    /// The signed URL
    #[arg(short = 'u', long = "url")]
    url: String,
    #[arg(short = 'm', long = "method", default_value = "GET")]
    method: String,
}

#[derive(Debug, Args)]
pub struct RequestParams {
    /// GET, POST, PUT, DELETE or OPTIONS
    method: String,
    /// The API endpoint, e.g. "products" or "orders/42"
    endpoint: String,
    /// Query parameters, as key=value
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,
    /// A JSON request body
    #[arg(short = 'd', long = "data")]
    data: Option<String>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("'{s}' is not of the form key=value"))
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let config = WooConfig::new_from_env_or_default();
    let result = match cli.command {
        Command::Sign(params) => print_signed_url(&config, params),
        Command::Verify(params) => print_verification(&config, params),
        Command::Request(params) => run_request(config, params).await,
    };
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
