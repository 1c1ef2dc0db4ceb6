use std::collections::BTreeMap;

/// Percent-encode a query component.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) pass through, a space becomes `+` and every other byte becomes
/// `%XX` with uppercase hex digits. The same rule is used when signing and when building the final query string, so
/// that a verifier decoding the query string arrives at the same canonical form.
pub fn percent_encode(s: &str) -> String {
    // `urlencoding` only emits `%20` for a space; a literal `%` is always `%25`, so this replacement is unambiguous.
    urlencoding::encode(s).replace("%20", "+")
}

/// Join parameters as `key=value` pairs separated by `&`, sorted by key, with keys and values percent-encoded.
pub fn encode_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<String>>()
        .join("&")
}
