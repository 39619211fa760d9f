//! Mobile-money payment session engine for the Mboa marketplace checkout.
//!
//! The crate owns the one hard part of the storefront: taking a checkout
//! from "pay now" to a persisted order against an asynchronous mobile-money
//! gateway. It detects the paying operator from the customer's phone number,
//! initiates the charge, polls for a terminal status under a hard deadline,
//! and reconciles a captured payment with the staged order, surfacing one
//! consistent state to the UI throughout.
//!
//! Collaborators the host application supplies:
//! - a [`payments::CredentialProvider`] producing the bearer token for
//!   gateway calls,
//! - a [`orders::RecordStore`] backing order persistence,
//! - optionally a [`orders::PendingOrderStore`] other than the default
//!   file-backed one.

pub mod config;
pub mod logging;
pub mod orders;
pub mod payments;

pub use config::{AppConfig, GatewayConfig, SessionConfig, StagingConfig};
pub use orders::{
    CreatedOrder, FilePendingOrderStore, InMemoryPendingOrderStore, OrderSubmitter, PendingOrder,
    PendingOrderStore, RecordStore,
};
pub use payments::{
    CredentialProvider, FailureReason, HttpPaymentGateway, Operator, PaymentGateway,
    PaymentReference, PaymentRequest, PaymentSession, PaymentStatus, SessionHandle, SessionState,
};
