//! W3C trace context from incoming headers.

use opentelemetry::{Context, global, propagation::Extractor, trace::TraceContextExt as _};
use salvo::http::{HeaderMap, HeaderName};

/// Remote parent carried by `traceparent`, if the header holds a valid one.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| {
        // Extract onto an empty context so a missing header never yields the
        // currently active span.
        let context = propagator.extract_with_context(&Context::new(), &TraceHeaders(headers));

        context
            .span()
            .span_context()
            .is_remote()
            .then_some(context)
    })
}

#[derive(Debug)]
struct TraceHeaders<'a>(&'a HeaderMap);

impl Extractor for TraceHeaders<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::HeaderValue;

    use super::*;

    #[test]
    fn traceparent_becomes_remote_parent() {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let mut headers = HeaderMap::new();

        headers.insert(
            "traceparent",
            HeaderValue::from_static("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        );

        let parent = extract_parent_context(&headers);

        assert!(parent.is_some(), "expected a parent context");

        assert!(
            extract_parent_context(&HeaderMap::new()).is_none(),
            "expected no parent without headers"
        );
    }
}
