use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{bill::Bill, order::PaymentMethod};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    #[error("Payment declined: {reason}")]
    Declined { reason: String },

    #[error("Payment service unavailable")]
    Unavailable,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub transaction_id: Uuid,
    pub method: PaymentMethod,
    pub amount: f64,
    pub paid_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, bill: &Bill) -> Result<PaymentConfirmation, PaymentError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedOutcome {
    Approve,
    Decline(String),
    Unavailable,
}

/// Stand-in gateway: waits for `delay`, then resolves with a fixed outcome.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentGateway {
    delay: Duration,
    outcome: SimulatedOutcome,
}

impl SimulatedPaymentGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            outcome: SimulatedOutcome::Approve,
        }
    }

    pub fn with_outcome(mut self, outcome: SimulatedOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn charge(&self, bill: &Bill) -> Result<PaymentConfirmation, PaymentError> {
        debug!(
            "Charging {:.2} via {} for bill {}",
            bill.total, bill.payment_method, bill.bill_number
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.outcome {
            SimulatedOutcome::Approve => Ok(PaymentConfirmation {
                transaction_id: Uuid::new_v4(),
                method: bill.payment_method,
                amount: bill.total,
                paid_at: Utc::now(),
            }),
            SimulatedOutcome::Decline(reason) => {
                warn!("Simulated decline for bill {}: {}", bill.bill_number, reason);
                Err(PaymentError::Declined {
                    reason: reason.clone(),
                })
            }
            SimulatedOutcome::Unavailable => Err(PaymentError::Unavailable),
        }
    }
}
