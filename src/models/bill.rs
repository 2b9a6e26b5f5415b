use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::cart::CartLine;
use crate::models::order::{CustomerInfo, Order, OrderType, PaymentMethod};

pub const DEFAULT_TAX_RATE: f64 = 0.18;
pub const DEFAULT_SERVICE_CHARGE_RATE: f64 = 0.10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RestaurantInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub gstin: Option<String>,
}

impl Default for RestaurantInfo {
    fn default() -> Self {
        Self {
            name: "Spice Garden".to_string(),
            address: "12 MG Road, Bengaluru".to_string(),
            phone: "+91 80 4000 1234".to_string(),
            gstin: None,
        }
    }
}

/// Tax and service charge rates applied to a subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    pub tax_rate: f64,
    pub service_charge_rate: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            service_charge_rate: DEFAULT_SERVICE_CHARGE_RATE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillAmounts {
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub discount: f64,
    pub total: f64,
}

impl PricingPolicy {
    /// Service charge applies to dine-in orders only. The discount is taken
    /// off last and is not checked here; see [`PricingPolicy::max_discount`].
    ///
    /// The subtotal is kept exactly as given so it always matches the order's
    /// line total. Only the derived amounts are rounded.
    pub fn compute(&self, subtotal: f64, order_type: OrderType, discount: f64) -> BillAmounts {
        let tax = round_currency(subtotal * self.tax_rate);
        let service_charge = if order_type.is_dine_in() {
            round_currency(subtotal * self.service_charge_rate)
        } else {
            0.0
        };
        let discount = round_currency(discount);
        let total = round_currency(subtotal + tax + service_charge - discount);

        BillAmounts {
            subtotal,
            tax,
            service_charge,
            discount,
            total,
        }
    }

    /// Largest discount that keeps the bill total non-negative.
    pub fn max_discount(&self, subtotal: f64, order_type: OrderType) -> f64 {
        self.compute(subtotal, order_type, 0.0).total
    }
}

/// Round to two decimal places, the smallest unit printed on a bill.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// `BILL-YYYYMMDD-NNNNNN`, where the suffix is the low six digits of the
/// millisecond timestamp.
pub fn generate_bill_number(at: DateTime<Utc>) -> String {
    let suffix = at.timestamp_millis().rem_euclid(1_000_000);
    format!("BILL-{}-{:06}", at.format("%Y%m%d"), suffix)
}

/// Immutable, tax-inclusive summary derived from an [`Order`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    pub order_id: Uuid,
    pub bill_number: String,
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub discount: f64,
    pub total: f64,
    pub order_type: OrderType,
    pub table_number: Option<u32>,
    pub payment_method: PaymentMethod,
    pub customer: CustomerInfo,
    pub restaurant: RestaurantInfo,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn for_order(
        order: &Order,
        policy: &PricingPolicy,
        discount: f64,
        payment_method: PaymentMethod,
        restaurant: RestaurantInfo,
    ) -> Self {
        let amounts = policy.compute(order.total, order.order_type, discount);
        let created_at = Utc::now();

        Self {
            id: Uuid::new_v4(),
            order_id: order.id,
            bill_number: generate_bill_number(created_at),
            lines: order.lines.clone(),
            subtotal: amounts.subtotal,
            tax: amounts.tax,
            service_charge: amounts.service_charge,
            discount: amounts.discount,
            total: amounts.total,
            order_type: order.order_type,
            table_number: order.table_number,
            payment_method,
            customer: order.customer.clone(),
            restaurant,
            created_at,
        }
    }

    pub fn amounts(&self) -> BillAmounts {
        BillAmounts {
            subtotal: self.subtotal,
            tax: self.tax,
            service_charge: self.service_charge,
            discount: self.discount,
            total: self.total,
        }
    }
}
