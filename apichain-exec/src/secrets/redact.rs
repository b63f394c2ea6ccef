use apichain_core::types::Headers;
use apichain_core::ApiRequest;

pub const REDACTED: &str = "<redacted>";

const ALWAYS_REDACTED: &[&str] = &["authorization", "proxy-authorization", "cookie", "set-cookie"];

/// Replaces credential-bearing header values. `extra` names the headers an auth config
/// wrote (e.g. an API key header).
pub fn redact_headers(headers: &Headers, extra: &[String]) -> Headers {
    let mut out = headers.clone();
    for name in ALWAYS_REDACTED.iter().copied().chain(extra.iter().map(String::as_str)) {
        redact_case_insensitive(&mut out, name);
    }
    out
}

/// Copy of `request` safe to log or persist: credential headers and the named query
/// parameters are masked.
pub fn redact_request(request: &ApiRequest, extra: &[String]) -> ApiRequest {
    let mut out = request.clone();
    match &mut out {
        ApiRequest::Rest(r) => {
            r.headers = redact_headers(&r.headers, extra);
            for name in extra {
                redact_case_insensitive(&mut r.query_params, name);
            }
        }
        ApiRequest::GraphQl(g) => g.headers = redact_headers(&g.headers, extra),
        ApiRequest::Grpc(g) => g.metadata = redact_headers(&g.metadata, extra),
        ApiRequest::Unsupported(_) => {}
    }
    out
}

fn redact_case_insensitive(map: &mut Headers, name: &str) {
    for (_, v) in map.iter_mut().filter(|(k, _)| k.eq_ignore_ascii_case(name)) {
        *v = REDACTED.to_string();
    }
}
