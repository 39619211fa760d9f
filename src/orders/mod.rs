//! Order staging and deferred creation: the checkout payload is staged
//! locally before payment initiation and only becomes a persisted order once
//! the charge is confirmed.

pub mod error;
pub mod staging;
pub mod submitter;
pub mod types;

pub use error::{RecordStoreError, StagingError, SubmissionError};
pub use staging::{FilePendingOrderStore, InMemoryPendingOrderStore, PendingOrderStore};
pub use submitter::{OrderSubmitter, RecordStore, ORDERS_COLLECTION};
pub use types::{Address, CreatedOrder, OrderItem, PendingOrder};
