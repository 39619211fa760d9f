use crate::config::GatewayConfig;
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::types::{PaymentInitiation, PaymentReference, PaymentRequest, PaymentStatus};
use crate::payments::utils::GatewayHttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Supplies the bearer credential for gateway calls.
///
/// Fetched at call time, never cached here, so an expired token surfaces as
/// `Unauthenticated` rather than a stale-token failure deep in a request.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;
}

/// The gateway's whole contract: accept an initiation and hand back a
/// reference; answer status queries for that reference. `query_status` is
/// idempotent on the gateway side; callers own deduplication.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentInitiation>;

    async fn query_status(&self, reference: &PaymentReference) -> PaymentResult<PaymentStatus>;
}

pub struct HttpPaymentGateway {
    config: GatewayConfig,
    credentials: Arc<dyn CredentialProvider>,
    http: GatewayHttpClient,
}

impl HttpPaymentGateway {
    pub fn new(
        config: GatewayConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> PaymentResult<Self> {
        let http = GatewayHttpClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            config,
            credentials,
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn bearer(&self) -> PaymentResult<String> {
        self.credentials
            .bearer_token()
            .await
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| PaymentError::Unauthenticated {
                message: "no credential available for gateway call".to_string(),
            })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentInitiation> {
        request.validate()?;
        let token = self.bearer().await?;

        let payload = serde_json::json!({
            "amount": request.amount,
            "customer": {
                "id": request.customer.id,
                "name": request.customer.name,
                "email": request.customer.email,
                "phone": request.customer.phone,
                "address": request.customer.address,
                "city": request.customer.city,
                "country": request.customer.country,
            },
            "description": request.description,
            "metadata": {
                "order_id": request.order_id,
                "payment_method": "mobile_money",
                "operator": request.operator,
            },
            "vendor_id": request.vendor_id,
        });

        let envelope: GatewayEnvelope<InitializeData> = self
            .http
            .request_json(
                reqwest::Method::POST,
                &self.endpoint("/api/payments/initialize"),
                &token,
                Some(&payload),
            )
            .await?;
        let data = unwrap_envelope(envelope)?;

        info!(
            reference = %data.reference,
            operator = %request.operator,
            order_id = %request.order_id,
            "mobile-money payment initiated"
        );

        Ok(PaymentInitiation {
            reference: PaymentReference::new(data.reference),
            ussd_code: data.ussd_code,
        })
    }

    async fn query_status(&self, reference: &PaymentReference) -> PaymentResult<PaymentStatus> {
        let token = self.bearer().await?;

        let envelope: GatewayEnvelope<StatusData> = self
            .http
            .request_json(
                reqwest::Method::GET,
                &self.endpoint(&format!("/api/payments/status/{}", reference)),
                &token,
                None,
            )
            .await?;
        let data = unwrap_envelope(envelope)?;

        let status = data.status.parse::<PaymentStatus>()?;
        debug!(reference = %data.reference, status = %status, "gateway status polled");
        Ok(status)
    }
}

#[derive(Debug, Deserialize)]
struct GatewayEnvelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InitializeData {
    reference: String,
    #[serde(default)]
    ussd_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusData {
    status: String,
    reference: String,
}

fn unwrap_envelope<T>(envelope: GatewayEnvelope<T>) -> PaymentResult<T> {
    if !envelope.success {
        return Err(PaymentError::GatewayRejected {
            message: envelope
                .message
                .unwrap_or_else(|| "gateway rejected the request".to_string()),
        });
    }
    envelope.data.ok_or_else(|| PaymentError::NetworkError {
        message: "gateway response missing data envelope".to_string(),
    })
}
