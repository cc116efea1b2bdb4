//! Target resolution: local vs. remote, final URL, merged options.
//!
//! # Rules
//! ```text
//! "/path"          → local  (local_prefix prepended, then query appended)
//! "http(s)://..."  → remote (query appended)
//! anything else    → CallError::Configuration
//! ```
//!
//! No I/O happens here.

use url::form_urlencoded;
use url::Url;

use crate::config::schema::DispatchOptions;
use crate::dispatch::error::CallError;
use crate::dispatch::options::{merge, CallOptions, ResolvedOptions, Verb};
use crate::http::request::{RequestContext, REFERRER_HEADER, X_REQUEST_ID};
use crate::transport::{OutboundRequest, TransportKind};

/// One attempt of a resolved call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub verb: Verb,
    pub transport: TransportKind,
    /// Final URL (local path or absolute URL) including the query string.
    pub url: String,
    pub options: ResolvedOptions,
    /// Zero for the first attempt.
    pub attempt: u32,
}

impl CallRequest {
    /// The same call, one attempt later.
    pub fn next_attempt(&self) -> CallRequest {
        CallRequest {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    pub fn outbound(&self) -> OutboundRequest {
        OutboundRequest {
            verb: self.verb,
            url: self.url.clone(),
            headers: self.options.headers.clone(),
            payload: self.options.payload.clone(),
            timeout: self.options.timeout,
        }
    }
}

/// Decide which transport serves `target`.
pub fn classify(target: &str) -> Result<TransportKind, CallError> {
    if target.starts_with('/') {
        return Ok(TransportKind::Local);
    }

    if !target.contains("://") {
        return Err(CallError::invalid_target(
            target,
            "expected a path starting with '/' or an absolute URL",
        ));
    }

    let url = Url::parse(target).map_err(|e| CallError::invalid_target(target, e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(TransportKind::Remote),
        "http" | "https" => Err(CallError::invalid_target(target, "missing host")),
        scheme => Err(CallError::invalid_target(
            target,
            format!("unsupported scheme '{scheme}'"),
        )),
    }
}

/// Append `query` to `target`, keeping any existing query first.
pub fn append_query(target: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return target.to_string();
    }

    let (base, fragment) = match target.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (target, None),
    };

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();

    let separator = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };

    let mut url = format!("{base}{separator}{encoded}");
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// Resolve a call into its first attempt.
pub fn resolve(
    verb: Verb,
    target: &str,
    call: &CallOptions,
    plugin: &DispatchOptions,
    context: Option<&RequestContext>,
) -> Result<CallRequest, CallError> {
    let transport = classify(target)?;
    let mut options = merge(call, plugin);

    let path = match (transport, options.local_prefix.as_deref()) {
        (TransportKind::Local, Some(prefix)) => format!("{prefix}{target}"),
        _ => target.to_string(),
    };
    let url = append_query(&path, &options.query);

    if let Some(context) = context {
        options
            .headers
            .entry(REFERRER_HEADER.to_string())
            .or_insert_with(|| context.url.clone());
        options
            .headers
            .entry(X_REQUEST_ID.to_string())
            .or_insert_with(|| context.request_id.clone());
    }

    Ok(CallRequest {
        verb,
        transport,
        url,
        options,
        attempt: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_classify_by_shape() {
        assert_eq!(classify("/literal").unwrap(), TransportKind::Local);
        assert_eq!(classify("/").unwrap(), TransportKind::Local);
        assert_eq!(classify("http://localhost:8000/literal").unwrap(), TransportKind::Remote);
        assert_eq!(classify("https://example.com").unwrap(), TransportKind::Remote);
    }

    #[test]
    fn test_classify_rejects_other_shapes() {
        for target in ["literal", "", "ftp://example.com/file", "localhost:8000/x", "http://"] {
            let err = classify(target).unwrap_err();
            assert!(matches!(err, CallError::Configuration { .. }), "{target}");
        }
    }

    #[test]
    fn test_append_query_without_existing() {
        assert_eq!(append_query("/x", &pairs(&[("value", "abc")])), "/x?value=abc");
    }

    #[test]
    fn test_append_query_keeps_existing_first() {
        assert_eq!(append_query("/x?b=2", &pairs(&[("a", "1")])), "/x?b=2&a=1");
    }

    #[test]
    fn test_append_query_never_duplicates_separator() {
        assert_eq!(append_query("/x?", &pairs(&[("a", "1")])), "/x?a=1");
        assert_eq!(append_query("/x?b=2&", &pairs(&[("a", "1")])), "/x?b=2&a=1");
    }

    #[test]
    fn test_append_query_encodes_and_keeps_fragment() {
        let url = append_query("/x#top", &pairs(&[("q", "a b&c")]));
        assert_eq!(url, "/x?q=a+b%26c#top");
    }

    #[test]
    fn test_append_query_empty_is_identity() {
        assert_eq!(append_query("/x?b=2", &[]), "/x?b=2");
    }

    #[test]
    fn test_resolve_applies_prefix_to_local_only() {
        let plugin = DispatchOptions {
            local_prefix: Some("/api".into()),
            ..Default::default()
        };
        let call = CallOptions::new().query("a", "1");

        let local = resolve(Verb::Get, "/x?b=2", &call, &plugin, None).unwrap();
        assert_eq!(local.transport, TransportKind::Local);
        assert_eq!(local.url, "/api/x?b=2&a=1");

        let remote = resolve(Verb::Get, "http://localhost:8000/x", &call, &plugin, None).unwrap();
        assert_eq!(remote.transport, TransportKind::Remote);
        assert_eq!(remote.url, "http://localhost:8000/x?a=1");
    }

    #[test]
    fn test_resolve_injects_context_headers_without_overriding() {
        let context = RequestContext::new("/inbound?x=1", "req-1");
        let call = CallOptions::new().header("x-request-id", "mine");

        let resolved =
            resolve(Verb::Get, "/x", &call, &DispatchOptions::default(), Some(&context)).unwrap();
        assert_eq!(resolved.options.headers.get("referrer").unwrap(), "/inbound?x=1");
        assert_eq!(resolved.options.headers.get("x-request-id").unwrap(), "mine");
    }

    #[test]
    fn test_mixed_case_header_is_not_duplicated() {
        let context = RequestContext::new("/inbound", "req-1");
        let mut call = CallOptions::new();
        call.headers.insert("Referrer".into(), "/mine".into());

        let resolved =
            resolve(Verb::Get, "/x", &call, &DispatchOptions::default(), Some(&context)).unwrap();
        assert_eq!(resolved.options.headers.get("referrer").unwrap(), "/mine");
        assert!(!resolved.options.headers.contains_key("Referrer"));
        assert_eq!(resolved.options.headers.len(), 2);
    }

    #[test]
    fn test_next_attempt_keeps_url() {
        let first = resolve(Verb::Post, "/x", &CallOptions::new(), &DispatchOptions::default(), None)
            .unwrap();
        let second = first.next_attempt();
        assert_eq!(second.attempt, 1);
        assert_eq!(second.url, first.url);
        assert_eq!(second.options, first.options);
    }
}
