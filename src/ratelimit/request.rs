//! Request metadata consumed by the rate-limit guard

use reqwest::Method;
use reqwest::header::HeaderMap;

/// Returned when no client address header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// The parts of an inbound HTTP request the guard needs.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
}

impl RequestMeta {
    pub fn new(method: Method, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
        }
    }

    /// Request path, whether `url` is absolute or already a path.
    pub fn path(&self) -> String {
        match reqwest::Url::parse(&self.url) {
            Ok(url) => url.path().to_string(),
            Err(_) => self.url.split('?').next().unwrap_or_default().to_string(),
        }
    }

    pub fn client_identifier(&self) -> String {
        extract_client_identifier(&self.headers)
    }
}

fn header_token<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let value = headers.get(name)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then_some(first)
}

/// Derive the client address from proxy headers.
///
/// Precedence: first hop of `x-forwarded-for`, then `x-real-ip`, then
/// `cf-connecting-ip`. Falls back to `"unknown"`.
pub fn extract_client_identifier(headers: &HeaderMap) -> String {
    ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"]
        .iter()
        .find_map(|name| header_token(headers, name))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_wins_over_other_headers() {
        let map = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1, 10.0.0.2"),
            ("x-real-ip", "198.51.100.2"),
            ("cf-connecting-ip", "192.0.2.9"),
        ]);
        assert_eq!(extract_client_identifier(&map), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_before_connecting_ip() {
        let map = headers(&[
            ("x-real-ip", " 198.51.100.2 "),
            ("cf-connecting-ip", "192.0.2.9"),
        ]);
        assert_eq!(extract_client_identifier(&map), "198.51.100.2");
    }

    #[test]
    fn test_connecting_ip_last() {
        let map = headers(&[("cf-connecting-ip", "192.0.2.9")]);
        assert_eq!(extract_client_identifier(&map), "192.0.2.9");
    }

    #[test]
    fn test_blank_forwarded_for_falls_through() {
        let map = headers(&[("x-forwarded-for", " , 10.0.0.1"), ("x-real-ip", "198.51.100.2")]);
        assert_eq!(extract_client_identifier(&map), "198.51.100.2");
    }

    #[test]
    fn test_unknown_without_headers() {
        assert_eq!(extract_client_identifier(&HeaderMap::new()), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_path_from_absolute_and_relative_urls() {
        let absolute = RequestMeta::new(
            Method::POST,
            "https://app.example.com/api/webhooks/stripe?x=1",
            HeaderMap::new(),
        );
        assert_eq!(absolute.path(), "/api/webhooks/stripe");

        let relative = RequestMeta::new(Method::GET, "/api/trpc/members.list?batch=1", HeaderMap::new());
        assert_eq!(relative.path(), "/api/trpc/members.list");
    }
}
