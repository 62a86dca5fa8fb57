use crate::types::ResolvedRequest;

/// Render a request as a copyable, multi-line `curl` command.
///
/// Headers are emitted in the order they appear on the request. The body is wrapped in
/// single quotes as-is; quotes inside it are not escaped.
pub fn format_curl(request: &ResolvedRequest) -> String {
    let mut lines = vec![format!("curl -X {} \"{}\"", request.method, request.url)];

    for (key, value) in &request.headers {
        lines.push(format!("  -H \"{}: {}\"", key, value));
    }

    if request.method.has_body() {
        if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
            lines.push(format!("  -d '{}'", body));
        }
    }

    lines.join(" \\\n")
}
