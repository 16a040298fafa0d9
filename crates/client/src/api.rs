//! HTTP client for the catalog/checkout service.
//!
//! Plain JSON over HTTP with `reqwest`. Requests are stateless with
//! respect to each other: no retries, no caching, no connection
//! guarantees. Configuration is re-read from the injected [`Settings`]
//! handle on every call.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Span, debug, instrument};
use uuid::Uuid;

use sandbar_core::TraceLog;
use sandbar_core::wire::{CheckoutRequest, CheckoutResponse, Product};

use crate::config::{ClientConfig, Settings};
use crate::error::{ClientError, extract_error_message};

/// Header carrying the debug scenario tag.
pub const SCENARIO_HEADER: &str = "X-Scenario";

/// Header carrying the client-generated request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// Artificial latency windows, used only when latency injection is on.
const GET_LATENCY_MS: std::ops::Range<u64> = 300..1000;
const POST_LATENCY_MS: std::ops::Range<u64> = 500..1500;

/// Client for the catalog/checkout service.
///
/// Cheaply cloneable. Every call generates a request id, records it on the
/// current tracing span and the Sentry scope, and pushes exactly one
/// correlation id to the trace log: the response body's `trace_id` when
/// present, the request id otherwise.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    settings: Settings,
    trace_log: Mutex<TraceLog>,
}

impl ApiClient {
    /// Create a new client reading its configuration through `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                settings,
                trace_log: Mutex::new(TraceLog::new()),
            }),
        }
    }

    /// The injected settings handle.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Snapshot of recently recorded correlation ids, most recent first.
    #[must_use]
    pub fn recent_trace_ids(&self) -> Vec<String> {
        self.lock_trace_log().to_vec()
    }

    /// Issue a GET against `base_url + path` and parse the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] on transport failure and
    /// [`ClientError::Decode`] if the body is not well-formed for `T`.
    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let config = self.inner.settings.snapshot();
        maybe_delay(&config, GET_LATENCY_MS).await;

        let request_id = Uuid::new_v4().to_string();
        let builder = self.build_request(
            self.inner.http.get(endpoint(&config, path)),
            &config,
            &request_id,
        );

        let (_, text, _) = self.dispatch(builder, &request_id).await?;
        serde_json::from_str(&text).map_err(ClientError::Decode)
    }

    /// Issue a JSON POST against `base_url + path` and parse the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] on transport failure,
    /// [`ClientError::Api`] on a non-success status (carrying the parsed
    /// error message and the status code), and [`ClientError::Decode`] if a
    /// success body is not well-formed for `T`.
    #[instrument(skip(self, body), fields(request_id = tracing::field::Empty))]
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let config = self.inner.settings.snapshot();
        maybe_delay(&config, POST_LATENCY_MS).await;

        let request_id = Uuid::new_v4().to_string();
        let builder = self
            .build_request(
                self.inner.http.post(endpoint(&config, path)),
                &config,
                &request_id,
            )
            .json(body);

        let (status, text, _) = self.dispatch(builder, &request_id).await?;

        if !status.is_success() {
            let message = extract_error_message(&text, status);
            debug!(status = %status, message = %message, "service returned non-success status");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(ClientError::Decode)
    }

    /// Fetch the product catalog from the configured endpoint.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::get`] errors.
    pub async fn catalog(&self, include_inventory: bool) -> Result<Vec<Product>, ClientError> {
        let mut path = self.inner.settings.snapshot().api_version.catalog_path();
        if include_inventory {
            path.push_str("?include=inventory");
        }
        self.get(&path).await
    }

    /// Submit a checkout request to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::post`] errors.
    pub async fn submit_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, ClientError> {
        let path = self.inner.settings.snapshot().api_version.checkout_path();
        self.post(&path, request).await
    }

    /// Attach the standard headers to an outbound request.
    fn build_request(
        &self,
        builder: reqwest::RequestBuilder,
        config: &ClientConfig,
        request_id: &str,
    ) -> reqwest::RequestBuilder {
        Span::current().record("request_id", request_id);
        sentry::configure_scope(|scope| {
            scope.set_tag("request_id", request_id);
        });

        let mut builder = builder
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id);
        if let Some(scenario) = &config.scenario {
            builder = builder.header(SCENARIO_HEADER, scenario);
        }
        builder
    }

    /// Send the request, read the body, and record the call's correlation
    /// id exactly once (success or failure).
    async fn dispatch(
        &self,
        builder: reqwest::RequestBuilder,
        request_id: &str,
    ) -> Result<(StatusCode, String, Option<serde_json::Value>), ClientError> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                self.record_trace(None, request_id);
                return Err(ClientError::Network(e));
            }
        };

        let status = response.status();

        // Read the body as text first for better error diagnostics
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                self.record_trace(None, request_id);
                return Err(ClientError::Network(e));
            }
        };

        let body = serde_json::from_str::<serde_json::Value>(&text).ok();
        self.record_trace(body.as_ref(), request_id);

        Ok((status, text, body))
    }

    /// Push the correlation id for a completed call: the response body's
    /// `trace_id` when it carries one, the generated request id otherwise.
    fn record_trace(&self, body: Option<&serde_json::Value>, request_id: &str) {
        let id = body
            .and_then(|value| value.get("trace_id"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or(request_id);
        self.lock_trace_log().push(id);
    }

    fn lock_trace_log(&self) -> std::sync::MutexGuard<'_, TraceLog> {
        self.inner
            .trace_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Join the configured base URL with a request path.
fn endpoint(config: &ClientConfig, path: &str) -> String {
    format!("{}{path}", config.base_url)
}

/// Sleep for a random duration inside `window` when latency injection is
/// enabled. Demo instrumentation only.
async fn maybe_delay(config: &ClientConfig, window: std::ops::Range<u64>) {
    if !config.inject_latency {
        return;
    }
    let ms = rand::rng().random_range(window);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
