use crate::payments::error::PaymentError;
use crate::payments::operator;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mobile-money operator inferred from a subscriber number prefix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Mtn,
    Orange,
    Unknown,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Mtn => "mtn",
            Operator::Orange => "orange",
            Operator::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Unknown)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = PaymentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "mtn" | "mtn_momo" => Ok(Operator::Mtn),
            "orange" | "orange_money" => Ok(Operator::Orange),
            _ => Err(PaymentError::ValidationError {
                message: format!("unsupported operator: {}", value),
                field: Some("operator".to_string()),
            }),
        }
    }
}

/// Normalized subscriber number: digits only, "237"-prefixed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalizes arbitrary user input. Non-digits are stripped, a leading
    /// country code is folded in, and the local part must keep at least
    /// eight digits.
    pub fn parse(raw: &str) -> Result<Self, PaymentError> {
        let local = operator::local_digits(raw);
        if local.len() < operator::MIN_LOCAL_DIGITS {
            return Err(PaymentError::ValidationError {
                message: format!("phone number has too few digits: {}", raw.trim()),
                field: Some("phone".to_string()),
            });
        }
        Ok(PhoneNumber(format!("{}{}", operator::COUNTRY_PREFIX, local)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits after the country prefix.
    pub fn local_part(&self) -> &str {
        &self.0[operator::COUNTRY_PREFIX.len()..]
    }

    pub fn operator(&self) -> Operator {
        operator::detect(&self.0)
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gateway-side payment status. `Pending` is the only non-terminal value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Successful => "SUCCESSFUL",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESSFUL" => Ok(PaymentStatus::Successful),
            "FAILED" => Ok(PaymentStatus::Failed),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            _ => Err(PaymentError::NetworkError {
                message: format!("unrecognized payment status: {}", value),
            }),
        }
    }
}

/// Opaque identifier issued by the gateway for one initiated transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    pub fn new(value: impl Into<String>) -> Self {
        PaymentReference(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: PhoneNumber,
    pub address: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in XAF. Zero-decimal currency, so whole francs.
    pub amount: u64,
    pub order_id: String,
    pub vendor_id: String,
    pub customer: Customer,
    pub operator: Operator,
    pub description: String,
}

impl PaymentRequest {
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.amount == 0 {
            return Err(PaymentError::ValidationError {
                message: "amount must be greater than zero".to_string(),
                field: Some("amount".to_string()),
            });
        }
        if !self.operator.is_known() {
            return Err(PaymentError::ValidationError {
                message: format!(
                    "could not determine a mobile-money operator for {}",
                    self.customer.phone
                ),
                field: Some("operator".to_string()),
            });
        }
        Ok(())
    }
}

/// What a successful initiation hands back: the gateway reference, and
/// optionally a USSD code the customer can dial to complete the charge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentInitiation {
    pub reference: PaymentReference,
    pub ussd_code: Option<String>,
}
