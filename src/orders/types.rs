use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: String,
    pub vendor_id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price in XAF.
    pub unit_price: u64,
}

/// Order payload captured at checkout and held until payment confirmation.
///
/// Staged before payment initiation, consumed when a successful charge
/// triggers order submission, and retained un-cleared if that submission
/// fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingOrder {
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub shipping_method: String,
    pub payment_method: String,
    pub subtotal: u64,
    pub shipping: u64,
    pub total_amount: u64,
}

/// Identifier of the persisted order produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub order_id: String,
}
