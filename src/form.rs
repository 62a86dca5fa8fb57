//! Headless tester form for a single endpoint.
//!
//! A form owns the values a user has entered for one endpoint, applies edits to them
//! and turns them into either an executed request or a curl command. It is what a UI
//! (or the CLI) drives; nothing here renders anything.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::curl::format_curl;
use crate::error::ApiError;
use crate::query::ParamValues;
use crate::request::{resolve_request, ApiClient, RequestConfig};
use crate::settings::{load_platform, load_token, save_credentials, SettingsStore};
use crate::token::infer_country;
use crate::types::{EndpointDescriptor, ExecutionResult, Platform, ResolvedRequest};

pub const RESPONSE_PLACEHOLDER: &str = "Response will appear here...";
pub const LOADING_TEXT: &str = "Loading...";

/// Query parameter filled from the token's country suffix
pub const COUNTRY_PARAM: &str = "country";

pub struct TesterForm<S> {
    endpoint: EndpointDescriptor,
    base_url: String,
    config: RequestConfig,
    store: Mutex<S>,
    /// Number of executions in flight.
    loading: AtomicUsize,
    output: Mutex<Option<ExecutionResult>>,
}

/// Releases its share of the loading state on every exit path, including a dropped future.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn engage(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S: SettingsStore> TesterForm<S> {
    /// Open a form seeded from the endpoint and the stored token/platform.
    pub fn open(endpoint: EndpointDescriptor, base_url: impl Into<String>, store: S) -> Self {
        let mut query_param_values = ParamValues::new();
        query_param_values.insert(COUNTRY_PARAM, "");
        for param in &endpoint.query_params {
            query_param_values.insert(param.name.clone(), "");
        }

        let url_param_values = endpoint
            .url_params
            .iter()
            .map(|p| (p.name.clone(), String::new()))
            .collect();

        let body_content = if endpoint.method.has_body() {
            seed_body(&endpoint)
        } else {
            String::new()
        };

        let config = RequestConfig {
            token: String::new(),
            platform: load_platform(&store),
            url_param_values,
            query_param_values,
            body_content,
        };

        let token = load_token(&store);
        let mut form = Self {
            endpoint,
            base_url: base_url.into(),
            config,
            store: Mutex::new(store),
            loading: AtomicUsize::new(0),
            output: Mutex::new(None),
        };
        form.set_token(token);
        form
    }

    pub fn endpoint(&self) -> &EndpointDescriptor {
        &self.endpoint
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Current value of a stored setting.
    pub fn setting(&self, key: &str) -> Option<String> {
        lock(&self.store).get(key)
    }

    pub fn into_store(self) -> S {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the token and auto-fill the country filter when the token carries a known
    /// suffix. With no match the current country is left as it is.
    pub fn set_token(&mut self, token: impl Into<String>) -> Option<&'static str> {
        self.config.token = token.into();
        let country = infer_country(&self.config.token);
        if let Some(country) = country {
            self.config.query_param_values.insert(COUNTRY_PARAM, country);
        }
        country
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.config.platform = platform;
    }

    pub fn set_url_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.config.url_param_values.insert(name, value);
    }

    pub fn set_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.config.query_param_values.insert(name, value);
    }

    /// Editable JSON view of the query values.
    pub fn params_json(&self) -> String {
        self.config.query_param_values.to_json_pretty()
    }

    /// Replace all query values from JSON text. Invalid text leaves them untouched.
    pub fn edit_params_json(&mut self, text: &str) -> Result<(), ApiError> {
        match ParamValues::from_json(text) {
            Ok(values) => {
                self.config.query_param_values = values;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint.id, error = %e, "rejected params edit");
                Err(e)
            }
        }
    }

    /// Replace the body text. Text that is not valid JSON leaves the body untouched.
    pub fn edit_body(&mut self, text: &str) -> Result<(), ApiError> {
        match serde_json::from_str::<Value>(text) {
            Ok(_) => {
                self.config.body_content = text.to_string();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint.id, error = %e, "rejected body edit");
                Err(e.into())
            }
        }
    }

    pub fn resolve(&self) -> Result<ResolvedRequest, ApiError> {
        resolve_request(&self.base_url, &self.endpoint, &self.config)
    }

    /// Render the request as curl without executing it.
    pub fn generate_curl(&self) -> Result<String, ApiError> {
        let request = self.resolve()?;
        self.remember_credentials();
        Ok(format_curl(&request))
    }

    /// Execute the request. Only validation errors are returned; transport failures
    /// end up in the result.
    ///
    /// Takes `&self` so [`is_loading`](Self::is_loading) and
    /// [`response_text`](Self::response_text) can be read while the call is in flight.
    pub async fn execute(&self, client: &ApiClient) -> Result<ExecutionResult, ApiError> {
        let request = self.resolve()?;
        self.remember_credentials();

        let result = {
            let _loading = LoadingGuard::engage(&self.loading);
            client.execute(&request).await
        };

        *lock(&self.output) = Some(result.clone());
        Ok(result)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub fn output(&self) -> Option<ExecutionResult> {
        lock(&self.output).clone()
    }

    /// Text for the response area.
    pub fn response_text(&self) -> String {
        if self.is_loading() {
            return LOADING_TEXT.to_string();
        }
        match &*lock(&self.output) {
            Some(result) => result.render(),
            None => RESPONSE_PLACEHOLDER.to_string(),
        }
    }

    fn remember_credentials(&self) {
        let mut store = lock(&self.store);
        if let Err(e) = save_credentials(&mut *store, &self.config.token, self.config.platform) {
            tracing::warn!(error = %e, "failed to persist token and platform");
        }
    }
}

// Guards are never held across an await, so a poisoned lock still holds consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `{ "<param>": "" , ... }` for the declared body params, or `{}`.
fn seed_body(endpoint: &EndpointDescriptor) -> String {
    if endpoint.body_params.is_empty() {
        return "{}".to_string();
    }
    let map: Map<String, Value> = endpoint
        .body_params
        .iter()
        .map(|p| (p.name.clone(), Value::String(String::new())))
        .collect();
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_else(|_| "{}".to_string())
}
