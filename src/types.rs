use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// HTTP Methods exposed by the documented API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// POST and PUT carry a JSON body and a `Content-Type` header.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ApiError::UnknownMethod(s.to_string())),
        }
    }
}

/// Dashboard selector forwarded as the `x-platform` header
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    #[serde(rename = "3ts")]
    ThreeTs,
    #[serde(rename = "gold")]
    Gold,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::ThreeTs => "3ts",
            Platform::Gold => "gold",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3ts" => Ok(Platform::ThreeTs),
            "gold" => Ok(Platform::Gold),
            other => Err(ApiError::UnknownPlatform(other.to_string())),
        }
    }
}

/// A declared parameter of an endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// Catalog entry describing one documented endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub id: String,
    pub method: HttpMethod,
    #[serde(rename = "path")]
    pub path_template: String,
    pub description: String,
    #[serde(default)]
    pub url_params: Vec<ParamSpec>,
    #[serde(default)]
    pub query_params: Vec<ParamSpec>,
    #[serde(default)]
    pub body_params: Vec<ParamSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A fully resolved request, ready to execute or render
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Ordered: Authorization, x-refresh, x-platform, then Content-Type when present.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Outcome of executing a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionResult {
    Response {
        status_line: String,
        body_text: String,
    },
    Failed {
        message: String,
    },
}

impl ExecutionResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionResult::Failed { .. })
    }

    /// Text shown in the response area
    pub fn render(&self) -> String {
        match self {
            ExecutionResult::Response {
                status_line,
                body_text,
            } => format!("{}\n\n{}", status_line, body_text),
            ExecutionResult::Failed { message } => format!("Error: {}", message),
        }
    }
}
