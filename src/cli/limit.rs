//! Rate-limit command implementations
//!
//! Runs the RPC guard in-process against the configured quotas, so quota
//! changes can be checked before they are deployed.

use std::sync::Arc;

use colored::Colorize;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::json;

use crate::audit::LogAuditSink;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::{Error, RateLimitError, Result};
use crate::models::LimitDisplay;
use crate::output::Formattable;
use crate::output::json::format_json;
use crate::ratelimit::{
    EndpointClass, IdentifierType, RateLimitGuard, RequestMeta, extract_client_identifier,
};

/// Config if present, defaults otherwise. These commands never need an API key.
fn load_guard(opts: &GlobalOptions) -> RateLimitGuard {
    let config = Config::load_at(opts.config_ref()).unwrap_or_default();
    RateLimitGuard::from_settings(&config.rate_limit, Arc::new(LogAuditSink))
}

fn warn_if_disabled(guard: &RateLimitGuard, format: OutputFormat) {
    if !guard.is_enabled() && format != OutputFormat::Json {
        eprintln!(
            "{} Rate limiting is disabled; every request is allowed",
            "⚠".yellow()
        );
    }
}

/// Parse repeated `-H 'name: value'` arguments.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| Error::Other(format!("invalid header '{}', expected 'name: value'", header)))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| Error::Other(format!("invalid header name '{}': {}", name.trim(), e)))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| Error::Other(format!("invalid header value for {}: {}", name, e)))?;
        headers.append(name, value);
    }
    Ok(headers)
}

/// Run the limit check command
pub async fn check(
    opts: &GlobalOptions,
    class: EndpointClass,
    ip: Option<String>,
    org: Option<String>,
    count: u32,
) -> Result<()> {
    let guard = load_guard(opts);
    warn_if_disabled(&guard, opts.format);

    let (identifier_type, identifier) = match (org, ip) {
        (Some(org), _) => (IdentifierType::Org, org),
        (None, Some(ip)) => (IdentifierType::Ip, ip),
        (None, None) => return Err(Error::Other("pass --ip or --org".to_string())),
    };

    let mut rows = Vec::new();
    for attempt in 1..=count.max(1) {
        let result = guard.check_limit(identifier_type, &identifier, class).await;
        rows.push(LimitDisplay::new(attempt, class, &identifier, &result));
    }

    rows.print(opts.format)
}

/// Run the limit identify command
pub fn identify(opts: &GlobalOptions, headers: &[String]) -> Result<()> {
    let headers = parse_headers(headers)?;
    let identifier = extract_client_identifier(&headers);

    match opts.format {
        OutputFormat::Json => println!("{}", format_json(&json!({ "identifier": identifier }))?),
        _ => println!("{}", identifier),
    }
    Ok(())
}

/// Run the limit request command: classify a request and pass it through the guard.
pub async fn request(
    opts: &GlobalOptions,
    method: &str,
    path: &str,
    headers: &[String],
    org: Option<&str>,
    count: u32,
) -> Result<()> {
    let guard = load_guard(opts);
    warn_if_disabled(&guard, opts.format);

    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|e| Error::Other(format!("invalid method '{}': {}", method, e)))?;
    let request = RequestMeta::new(method, path, parse_headers(headers)?);
    let class = EndpointClass::from_path(&request.path(), org.is_some());
    let identifier = match (class.identifier_type(org.is_some()), org) {
        (IdentifierType::Org, Some(org)) => org.to_string(),
        _ => request.client_identifier(),
    };

    let mut rows = Vec::new();
    let mut rejection = None;
    for attempt in 1..=count.max(1) {
        match guard.guard(&request, org).await {
            Ok(result) => {
                rows.push(LimitDisplay::new(attempt, class, &identifier, &result));
            }
            Err(rejected) => {
                rows.push(LimitDisplay::new(
                    attempt,
                    rejected.class,
                    &rejected.identifier,
                    &rejected.result,
                ));
                rejection = Some(rejected);
            }
        }
    }

    rows.print(opts.format)?;

    let Some(rejected) = rejection else {
        return Ok(());
    };
    if opts.format != OutputFormat::Json {
        println!("\n{} {}", "Last rejection:".bold(), rejected.status());
        for (name, value) in rejected.headers().iter() {
            println!("  {}: {}", name, value.to_str().unwrap_or_default());
        }
        println!("  {}", rejected.body());
        println!("\n{}", RateLimitError::from(rejected).to_string().red());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            "X-Forwarded-For: 203.0.113.7, 10.0.0.1".to_string(),
            "x-real-ip:198.51.100.2".to_string(),
        ])
        .unwrap();

        assert_eq!(extract_client_identifier(&headers), "203.0.113.7");
        assert_eq!(headers.get("x-real-ip").unwrap(), "198.51.100.2");
    }

    #[test]
    fn test_parse_headers_rejects_malformed() {
        assert!(parse_headers(&["no-colon".to_string()]).is_err());
        assert!(parse_headers(&["bad name: 1".to_string()]).is_err());
    }
}
