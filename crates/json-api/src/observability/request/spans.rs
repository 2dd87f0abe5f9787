//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Replace ids in `path` with placeholders so routes aggregate.
fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        normalised.push_str(placeholder(segment).unwrap_or(segment));
    }

    normalised
}

fn placeholder(segment: &str) -> Option<&'static str> {
    if Uuid::parse_str(segment).is_ok() {
        return Some("{uuid}");
    }

    if is_generated_id(segment, "ORD") {
        return Some("{order}");
    }

    if is_generated_id(segment, "TXN") {
        return Some("{transaction}");
    }

    None
}

fn is_generated_id(segment: &str, prefix: &str) -> bool {
    segment.strip_prefix(prefix).is_some_and(|rest| {
        !rest.is_empty() && rest.bytes().all(|byte| byte.is_ascii_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_replaced_with_placeholders() {
        let uuid = Uuid::now_v7();

        assert_eq!(
            request_span_name("PUT", &format!("/cart/items/{uuid}")).otel_span_name,
            "PUT /cart/items/{uuid}"
        );
        assert_eq!(
            request_span_name("POST", "/orders/ORD48213377K3ZQ9A/payments").otel_path,
            "/orders/{order}/payments"
        );
        assert_eq!(
            request_span_name("GET", "/payments/TXN1718000000000a9Bc3D").otel_path,
            "/payments/{transaction}"
        );
    }

    #[test]
    fn static_segments_are_kept() {
        assert_eq!(request_span_name("GET", "/").otel_path, "/");
        assert_eq!(request_span_name("GET", "/orders").otel_path, "/orders");
        assert_eq!(
            request_span_name("POST", "/payments/callback").otel_path,
            "/payments/callback"
        );
    }
}
