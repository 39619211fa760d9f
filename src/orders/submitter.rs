use crate::orders::error::{RecordStoreError, SubmissionError};
use crate::orders::types::{CreatedOrder, PendingOrder};
use crate::payments::types::PaymentReference;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

/// Generic record-store surface of the managed backend. Collections hold JSON
/// records; every operation returns the affected record(s) or a typed error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(
        &self,
        collection: &str,
        record: JsonValue,
    ) -> Result<JsonValue, RecordStoreError>;

    async fn read(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<JsonValue>, RecordStoreError>;

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<JsonValue, RecordStoreError>;

    async fn query(
        &self,
        collection: &str,
        filter: JsonValue,
    ) -> Result<Vec<JsonValue>, RecordStoreError>;
}

pub const ORDERS_COLLECTION: &str = "orders";

/// Turns a staged order plus a confirmed payment reference into a persisted
/// order record.
///
/// The reference rides along as the natural idempotency key: the backend must
/// not create a second order for a repeated (order, reference) pair, which is
/// what makes a re-submission after a lost response safe.
pub struct OrderSubmitter {
    records: Arc<dyn RecordStore>,
}

impl OrderSubmitter {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        OrderSubmitter { records }
    }

    pub async fn submit(
        &self,
        pending: &PendingOrder,
        reference: &PaymentReference,
        user_id: &str,
    ) -> Result<CreatedOrder, SubmissionError> {
        let record = serde_json::json!({
            "user_id": user_id,
            "payment_reference": reference.as_str(),
            "payment_method": pending.payment_method,
            "shipping_method": pending.shipping_method,
            "items": pending.items,
            "shipping_address": pending.shipping_address,
            "billing_address": pending.billing_address,
            "subtotal": pending.subtotal,
            "shipping": pending.shipping,
            "total_amount": pending.total_amount,
            "status": "pending",
        });

        let created = self.records.create(ORDERS_COLLECTION, record).await?;
        let order_id = created
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| SubmissionError::SubmissionFailed {
                message: "created order record carries no id".to_string(),
            })?;

        info!(
            order_id = %order_id,
            reference = %reference,
            total_amount = pending.total_amount,
            "order record created for confirmed payment"
        );
        Ok(CreatedOrder { order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::types::{Address, OrderItem};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    fn sample_order() -> PendingOrder {
        PendingOrder {
            items: vec![OrderItem {
                product_id: "p_100".to_string(),
                vendor_id: "v_7".to_string(),
                name: "Wax print fabric, 6 yards".to_string(),
                quantity: 2,
                unit_price: 6_500,
            }],
            shipping_address: Address {
                street: "Rue 1.839, Bastos".to_string(),
                city: "Yaounde".to_string(),
                region: "Centre".to_string(),
                country: "CM".to_string(),
            },
            billing_address: Address {
                street: "Rue 1.839, Bastos".to_string(),
                city: "Yaounde".to_string(),
                region: "Centre".to_string(),
                country: "CM".to_string(),
            },
            shipping_method: "pickup_point".to_string(),
            payment_method: "mobile_money".to_string(),
            subtotal: 13_000,
            shipping: 2_000,
            total_amount: 15_000,
        }
    }

    struct RecordingStore {
        create_calls: AtomicUsize,
        last_record: Mutex<Option<JsonValue>>,
        fail: bool,
    }

    impl RecordingStore {
        fn new(fail: bool) -> Self {
            RecordingStore {
                create_calls: AtomicUsize::new(0),
                last_record: Mutex::new(None),
                fail,
            }
        }
    }

    #[async_trait]
    impl RecordStore for RecordingStore {
        async fn create(
            &self,
            collection: &str,
            record: JsonValue,
        ) -> Result<JsonValue, RecordStoreError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RecordStoreError::Unavailable {
                    message: "backend offline".to_string(),
                });
            }
            *self.last_record.lock().await = Some(record.clone());
            let mut created = record;
            created["id"] = serde_json::json!("ord_created_1");
            assert_eq!(collection, ORDERS_COLLECTION);
            Ok(created)
        }

        async fn read(
            &self,
            _collection: &str,
            _id: &str,
        ) -> Result<Option<JsonValue>, RecordStoreError> {
            Ok(None)
        }

        async fn update(
            &self,
            _collection: &str,
            _id: &str,
            patch: JsonValue,
        ) -> Result<JsonValue, RecordStoreError> {
            Ok(patch)
        }

        async fn query(
            &self,
            _collection: &str,
            _filter: JsonValue,
        ) -> Result<Vec<JsonValue>, RecordStoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn submit_creates_one_pending_order_record() {
        let store = Arc::new(RecordingStore::new(false));
        let submitter = OrderSubmitter::new(store.clone());

        let created = submitter
            .submit(
                &sample_order(),
                &PaymentReference::new("ref_9"),
                "u_1",
            )
            .await
            .expect("submit");

        assert_eq!(created.order_id, "ord_created_1");
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

        let record = store.last_record.lock().await.clone().expect("record");
        assert_eq!(record["payment_reference"], "ref_9");
        assert_eq!(record["status"], "pending");
        assert_eq!(record["user_id"], "u_1");
        assert_eq!(record["total_amount"], 15_000);
    }

    #[tokio::test]
    async fn backend_failure_maps_to_submission_failed() {
        let store = Arc::new(RecordingStore::new(true));
        let submitter = OrderSubmitter::new(store);

        let err = submitter
            .submit(&sample_order(), &PaymentReference::new("ref_9"), "u_1")
            .await
            .expect_err("must fail");
        assert!(matches!(err, SubmissionError::SubmissionFailed { .. }));
    }
}
