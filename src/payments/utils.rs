use crate::payments::error::{PaymentError, PaymentResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Thin reqwest wrapper shared by the gateway client.
///
/// Performs exactly one HTTP call per invocation. Poll deduplication and
/// retry policy live with the caller, whose deadline is the backstop for
/// transient failures.
#[derive(Clone)]
pub struct GatewayHttpClient {
    client: Client,
    timeout: Duration,
}

impl GatewayHttpClient {
    pub fn new(timeout: Duration) -> PaymentResult<Self> {
        let client =
            Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| PaymentError::NetworkError {
                    message: format!("failed to initialize HTTP client: {}", e),
                })?;

        Ok(Self { client, timeout })
    }

    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        bearer_token: &str,
        body: Option<&JsonValue>,
    ) -> PaymentResult<T> {
        let mut request = self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .bearer_auth(bearer_token)
            .header("Accept", "application/json");
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError {
                message: format!("gateway request failed: {}", e),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            return serde_json::from_str::<T>(&text).map_err(|e| PaymentError::NetworkError {
                message: format!("invalid gateway JSON response: {}", e),
            });
        }

        if status.as_u16() == 401 {
            return Err(PaymentError::Unauthenticated {
                message: "gateway rejected credential (HTTP 401)".to_string(),
            });
        }

        if status.is_server_error() {
            return Err(PaymentError::NetworkError {
                message: format!("gateway unavailable (HTTP {})", status),
            });
        }

        // Client error: surface the gateway's own message when the body
        // carries one.
        let message = serde_json::from_str::<JsonValue>(&text)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}: {}", status, text));
        Err(PaymentError::GatewayRejected { message })
    }
}
