use reqwest::StatusCode;

use crate::error::ApiError;
use crate::query::{build_query, ParamValues};
use crate::template::resolve_path;
use crate::token::strip_country_suffix;
use crate::types::{EndpointDescriptor, ExecutionResult, HttpMethod, Platform, ResolvedRequest};

/// Static value sent as `x-refresh`; the tester never holds a real refresh token.
pub const REFRESH_PLACEHOLDER: &str = "your_refresh_token_here";

/// User-entered values for one endpoint form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub token: String,
    pub platform: Platform,
    pub url_param_values: ParamValues,
    pub query_param_values: ParamValues,
    /// Raw JSON text, only sent for POST and PUT.
    pub body_content: String,
}

/// Fixed header set, in the order they are sent and rendered.
pub fn build_headers(method: HttpMethod, token: &str, platform: Platform) -> Vec<(String, String)> {
    let mut headers = vec![
        (
            "Authorization".to_string(),
            format!("Bearer {}", strip_country_suffix(token)),
        ),
        ("x-refresh".to_string(), REFRESH_PLACEHOLDER.to_string()),
        ("x-platform".to_string(), platform.as_str().to_string()),
    ];
    if method.has_body() {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    headers
}

/// Turn an endpoint and its form values into a concrete request.
///
/// Fails without side effects when a required placeholder has no value.
pub fn resolve_request(
    base_url: &str,
    endpoint: &EndpointDescriptor,
    config: &RequestConfig,
) -> Result<ResolvedRequest, ApiError> {
    let resolved = resolve_path(
        &endpoint.path_template,
        &config.url_param_values,
        &endpoint.url_params,
    );
    if !resolved.is_complete() {
        return Err(ApiError::MissingParameters(resolved.missing));
    }
    if !resolved.stray.is_empty() {
        tracing::debug!(endpoint = %endpoint.id, stray = ?resolved.stray, "declared url params not in path");
    }

    let mut url = format!("{}{}", base_url.trim_end_matches('/'), resolved.path);
    let query = build_query(&config.query_param_values);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    let method = endpoint.method;
    let body = method.has_body().then(|| config.body_content.clone());

    Ok(ResolvedRequest {
        method,
        url,
        headers: build_headers(method, &config.token, config.platform),
        body,
    })
}

/// Status line plus pretty JSON, or the raw text when the payload is not JSON.
pub fn decode_response(status: StatusCode, text: String) -> ExecutionResult {
    let status_line = format!(
        "Status: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string();

    let body_text = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or(text),
        Err(_) => text,
    };

    ExecutionResult::Response {
        status_line,
        body_text,
    }
}

/// Thin wrapper over a shared `reqwest::Client`
#[derive(Clone, Debug, Default)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Execute a resolved request. Transport failures come back as
    /// [`ExecutionResult::Failed`], never as a panic or `Err`.
    pub async fn execute(&self, request: &ResolvedRequest) -> ExecutionResult {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        match self.send(request).await {
            Ok((status, text)) => {
                tracing::debug!(url = %request.url, %status, "response received");
                decode_response(status, text)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "request failed");
                ExecutionResult::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn send(&self, request: &ResolvedRequest) -> Result<(StatusCode, String), reqwest::Error> {
        let url = request.url.as_str();
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(url),
            HttpMethod::Post => self.http.post(url),
            HttpMethod::Put => self.http.put(url),
            HttpMethod::Delete => self.http.delete(url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if request.method.has_body() {
            if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
                builder = builder.body(body.to_string());
            }
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        Ok((status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamSpec;

    fn endpoint(method: HttpMethod, path: &str, url_params: &[&str]) -> EndpointDescriptor {
        EndpointDescriptor {
            id: "test".into(),
            method,
            path_template: path.into(),
            description: String::new(),
            url_params: url_params
                .iter()
                .map(|n| ParamSpec {
                    name: n.to_string(),
                    description: String::new(),
                    required: true,
                })
                .collect(),
            query_params: Vec::new(),
            body_params: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn get_with_placeholder_and_no_query() {
        let config = RequestConfig {
            token: "abc".into(),
            url_param_values: [("id", "42")].into_iter().collect(),
            ..Default::default()
        };
        let request = resolve_request(
            "https://api.example.com",
            &endpoint(HttpMethod::Get, "/mines/{id}", &["id"]),
            &config,
        )
        .unwrap();
        assert_eq!(request.url, "https://api.example.com/mines/42");
        assert_eq!(request.body, None);
        assert_eq!(request.headers.len(), 3);
    }

    #[test]
    fn trailing_slash_on_base_url_is_not_doubled() {
        let request = resolve_request(
            "https://api.example.com/",
            &endpoint(HttpMethod::Get, "/mines", &[]),
            &RequestConfig::default(),
        )
        .unwrap();
        assert_eq!(request.url, "https://api.example.com/mines");
    }

    #[test]
    fn query_values_are_appended() {
        let config = RequestConfig {
            query_param_values: [("country", "Rwanda"), ("year", "")].into_iter().collect(),
            ..Default::default()
        };
        let request = resolve_request(
            "https://api.example.com",
            &endpoint(HttpMethod::Get, "/overview/risks", &[]),
            &config,
        )
        .unwrap();
        assert_eq!(request.url, "https://api.example.com/overview/risks?country=Rwanda");
    }

    #[test]
    fn missing_placeholder_blocks_resolution() {
        let err = resolve_request(
            "https://api.example.com",
            &endpoint(HttpMethod::Delete, "/users/{uid}", &["uid"]),
            &RequestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::MissingParameters(m) if m == vec!["uid".to_string()]));
    }

    #[test]
    fn headers_use_cleaned_token_and_fixed_order() {
        let headers = build_headers(HttpMethod::Put, "secret.wr", Platform::Gold);
        let keys: Vec<_> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Authorization", "x-refresh", "x-platform", "Content-Type"]);
        assert_eq!(headers[0].1, "Bearer secret");
        assert_eq!(headers[2].1, "gold");
        assert_eq!(headers[3].1, "application/json");
    }

    #[test]
    fn padded_annotated_token_is_sent_without_suffix() {
        let headers = build_headers(HttpMethod::Get, "secret.wr ", Platform::ThreeTs);
        assert_eq!(headers[0].1, "Bearer secret");
    }

    #[test]
    fn body_only_travels_with_post_and_put() {
        let config = RequestConfig {
            body_content: r#"{"name":"x"}"#.into(),
            url_param_values: [("uid", "9")].into_iter().collect(),
            ..Default::default()
        };
        let put = resolve_request(
            "https://api.example.com",
            &endpoint(HttpMethod::Put, "/users/{uid}", &["uid"]),
            &config,
        )
        .unwrap();
        assert_eq!(put.body.as_deref(), Some(r#"{"name":"x"}"#));

        let delete = resolve_request(
            "https://api.example.com",
            &endpoint(HttpMethod::Delete, "/users/{uid}", &["uid"]),
            &config,
        )
        .unwrap();
        assert_eq!(delete.body, None);
    }

    #[test]
    fn json_payload_is_pretty_printed() {
        let result = decode_response(StatusCode::OK, r#"{"success":true}"#.into());
        assert_eq!(result.render(), "Status: 200 OK\n\n{\n  \"success\": true\n}");
    }

    #[test]
    fn non_json_payload_falls_back_to_text() {
        let result = decode_response(StatusCode::NOT_FOUND, "Cannot GET /nope".into());
        assert_eq!(result.render(), "Status: 404 Not Found\n\nCannot GET /nope");
    }

    #[test]
    fn unknown_status_code_has_no_reason() {
        let status = StatusCode::from_u16(599).unwrap();
        let result = decode_response(status, String::new());
        assert_eq!(result.render(), "Status: 599\n\n");
    }
}
