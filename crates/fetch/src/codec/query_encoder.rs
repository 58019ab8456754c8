//! Percent-encoding of query parameters and form bodies.
//!
//! Both GET query strings and POST form bodies use the
//! `application/x-www-form-urlencoded` format, so they share one encoder.
//! Encoding happens eagerly on the submitting thread, the reactor side only
//! ever sees finished urls and bodies.

use bytes::Bytes;

/// Percent-encodes `(name, value)` pairs and joins them with `&`/`=`.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Appends encoded query parameters to a url.
///
/// Uses `?` when the url has no query string yet, `&` otherwise. Empty
/// parameter lists leave the url untouched.
pub fn append_query(url: &mut String, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        return;
    }
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&encode_pairs(pairs));
}

/// Encodes form parameters into a request body.
pub fn form_body(pairs: &[(String, String)]) -> Bytes {
    if pairs.is_empty() {
        return Bytes::new();
    }
    Bytes::from(encode_pairs(pairs))
}
