//! Mobile-money payment flow: operator detection, gateway client, and the
//! session state machine that drives a charge from initiation to a terminal
//! outcome.

pub mod error;
pub mod gateway;
pub mod operator;
pub mod session;
pub mod types;
pub mod utils;

pub use error::{PaymentError, PaymentResult};
pub use gateway::{CredentialProvider, HttpPaymentGateway, PaymentGateway};
pub use session::{FailureReason, PaymentSession, SessionHandle, SessionState};
pub use types::{
    Customer, Operator, PaymentInitiation, PaymentReference, PaymentRequest, PaymentStatus,
    PhoneNumber,
};
