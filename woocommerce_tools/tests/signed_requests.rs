use std::{collections::HashSet, net::SocketAddr};

use hmac::{Hmac, Mac};
use reqwest::Method;
use serde_json::{json, Value};
use sha2::Sha256;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use woocommerce_tools::{verify_signed_url, Credentials, SignatureBuilder, WooApi, WooApiError, WooConfig};

const KEY: &str = "ck_2f1c0a6e";
const SECRET: &str = "cs_77b3d910";
const ORDERS: &str = "http://shop.local/wp-json/wc/v3/orders";

// An independent HMAC-SHA256 over the published base string, to pin the wire format.
#[test]
fn known_vector_matches_independent_hmac() {
    let base = "GET&https%3A%2F%2Fexample.com%2Fwp-json%2Fwc%2Fv3%2Fproducts&oauth_consumer_key%3Dck_test%26\
                oauth_nonce%3D00000000000000000000000000000000%26oauth_signature_method%3DHMAC-SHA256%26\
                oauth_timestamp%3D1700000000";
    let mut mac = Hmac::<Sha256>::new_from_slice(b"cs_test&").unwrap();
    mac.update(base.as_bytes());
    let expected = base64::encode(mac.finalize().into_bytes());

    let builder = SignatureBuilder::new(Credentials::new("ck_test", "cs_test"), "wc/v3");
    let signed = builder
        .sign_with_nonce(
            "https://example.com/wp-json/wc/v3/products",
            "GET",
            &[],
            1_700_000_000,
            "00000000000000000000000000000000",
        )
        .unwrap();
    let url = url::Url::parse(&signed).unwrap();
    let signature = url.query_pairs().find(|(k, _)| k == "oauth_signature").map(|(_, v)| v.into_owned()).unwrap();
    assert_eq!(signature, expected);
}

#[test]
fn concurrent_signers_share_one_builder() {
    let builder = SignatureBuilder::new(Credentials::new(KEY, SECRET), "wc/v3");
    let urls = std::thread::scope(|s| {
        let handles = (0..8)
            .map(|i| {
                let builder = &builder;
                s.spawn(move || {
                    (0..25)
                        .map(|j| {
                            let page = format!("{}", i * 100 + j);
                            let params = [("page", page.as_str())];
                            builder.sign(ORDERS, "GET", &params, 1_712_000_000).unwrap()
                        })
                        .collect::<Vec<String>>()
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect::<Vec<String>>()
    });
    let creds = Credentials::new(KEY, SECRET);
    let mut nonces = HashSet::new();
    for url in &urls {
        verify_signed_url(url, "GET", &creds, "wc/v3").unwrap();
        let parsed = url::Url::parse(url).unwrap();
        let nonce = parsed.query_pairs().find(|(k, _)| k == "oauth_nonce").map(|(_, v)| v.into_owned()).unwrap();
        nonces.insert(nonce);
    }
    assert_eq!(nonces.len(), 200);
}

/// Accepts a single HTTP request, checks its OAuth signature and answers with a JSON echo, or 401.
async fn serve_once(listener: TcpListener, addr: SocketAddr) {
    let (mut stream, _) = listener.accept().await.unwrap();
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().unwrap())
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body was complete");
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();

    let mut request_line = head.lines().next().unwrap().split(' ');
    let method = request_line.next().unwrap().to_string();
    let target = request_line.next().unwrap().to_string();
    let url = format!("http://{addr}{target}");
    let creds = Credentials::new(KEY, SECRET);
    let (status, payload) = match verify_signed_url(&url, &method, &creds, "wc/v3") {
        Ok(()) => {
            let body = if body.is_empty() { Value::Null } else { serde_json::from_str(&body).unwrap() };
            ("200 OK", json!({ "method": method, "body": body }).to_string())
        },
        Err(e) => {
            let payload = json!({ "code": "woocommerce_rest_authentication_error", "message": e.to_string() });
            ("401 Unauthorized", payload.to_string())
        },
    };
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: \
         close\r\n\r\n{payload}",
        payload.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
}

async fn local_store() -> (WooConfig, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_once(listener, addr));
    (WooConfig::new(&format!("http://{addr}"), KEY, SECRET), server)
}

#[tokio::test]
async fn plain_http_store_accepts_signed_post() {
    let _ = env_logger::try_init();
    let (config, server) = local_store().await;
    let api = WooApi::new(config).unwrap();
    let product = json!({ "name": "Ninja Hoodie", "type": "simple", "regular_price": "39.00" });
    let result = api
        .rest_query::<Value, Value>(Method::POST, "products", &[("context", "edit")], Some(&product))
        .await
        .unwrap();
    assert_eq!(result["method"], "POST");
    assert_eq!(result["body"], product);
    server.await.unwrap();
}

#[tokio::test]
async fn plain_http_store_rejects_wrong_secret() {
    let (mut config, server) = local_store().await;
    config.consumer_secret = "cs_wrong".to_string().into();
    let api = WooApi::new(config).unwrap();
    let err = api.rest_query::<Value, ()>(Method::GET, "orders", &[("status", "processing")], None).await.unwrap_err();
    match err {
        WooApiError::QueryError { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("signature is invalid"));
        },
        e => panic!("Unexpected error: {e}"),
    }
    server.await.unwrap();
}
