use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    models::{
        bill::{Bill, PricingPolicy, RestaurantInfo},
        order::{CheckoutRequest, Order},
    },
    services::{
        cart_service::CartService,
        notifier::{Notification, Notifier},
        payment::{PaymentConfirmation, PaymentError, PaymentGateway},
    },
};

pub const DEFAULT_TABLE_NUMBER: u32 = 1;
pub const DEFAULT_TABLE_COUNT: u32 = 20;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    #[error("Payment failed: {0}")]
    PaymentError(#[from] PaymentError),
}

/// Everything a successful checkout hands back for display or printing.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub bill: Bill,
    pub payment: PaymentConfirmation,
}

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub pricing: PricingPolicy,
    pub restaurant: RestaurantInfo,
    pub table_count: u32,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            restaurant: RestaurantInfo::default(),
            table_count: DEFAULT_TABLE_COUNT,
        }
    }
}

// Clears the in-progress flag on every exit path
struct InProgressGuard<'a>(&'a AtomicBool);

impl<'a> InProgressGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CheckoutService {
    cart_service: Arc<CartService>,
    payment_gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    settings: CheckoutSettings,
    in_progress: AtomicBool,
}

impl CheckoutService {
    pub fn new(
        cart_service: Arc<CartService>,
        payment_gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            cart_service,
            payment_gateway,
            notifier,
            settings,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Validate, snapshot the cart into an order and bill, take payment, then
    /// take the ordered lines out of the cart.
    ///
    /// Nothing is built and the cart is left alone unless every step succeeds.
    /// Items added while the payment is pending stay in the cart.
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let _guard = InProgressGuard::acquire(&self.in_progress).ok_or_else(|| {
            warn!("Rejected checkout: another checkout is in progress");
            CheckoutError::CheckoutInProgress
        })?;

        info!(
            "Checkout requested by {} ({})",
            request.customer_name.trim(),
            request.order_type
        );

        if let Err(e) = self.validate_request(&request) {
            self.notifier.notify(Notification::error(e.to_string()));
            return Err(e);
        }

        let cart = self.cart_service.snapshot().await;
        if cart.is_empty() {
            self.notifier
                .notify(Notification::error("Your cart is empty"));
            return Err(CheckoutError::EmptyCart);
        }

        let max_discount = self
            .settings
            .pricing
            .max_discount(cart.total(), request.order_type);
        if request.discount > max_discount {
            let e = CheckoutError::ValidationError {
                message: format!(
                    "Discount {:.2} exceeds the bill amount {:.2}",
                    request.discount, max_discount
                ),
            };
            self.notifier.notify(Notification::error(e.to_string()));
            return Err(e);
        }

        let table_number = if request.order_type.is_dine_in() {
            Some(request.table_number.unwrap_or(DEFAULT_TABLE_NUMBER))
        } else {
            None
        };

        let order = Order::from_cart(
            &cart,
            request.customer(),
            request.order_type,
            table_number,
            request.special_instructions.clone(),
        );
        let bill = Bill::for_order(
            &order,
            &self.settings.pricing,
            request.discount,
            request.payment_method,
            self.settings.restaurant.clone(),
        );

        let payment = match self.payment_gateway.charge(&bill).await {
            Ok(payment) => payment,
            Err(e) => {
                error!("Payment for bill {} failed: {}", bill.bill_number, e);
                self.notifier.notify(Notification::error(format!(
                    "Payment failed: {}. Your cart has been kept, please try again.",
                    e
                )));
                return Err(CheckoutError::PaymentError(e));
            }
        };

        self.cart_service.remove_ordered(&order.lines).await;
        info!(
            "Order {} placed, bill {} total {:.2}",
            order.id, bill.bill_number, bill.total
        );
        self.notifier.notify(Notification::success(format!(
            "Order placed! Bill {} for {:.2}",
            bill.bill_number, bill.total
        )));

        Ok(CheckoutReceipt {
            order,
            bill,
            payment,
        })
    }

    fn validate_request(&self, request: &CheckoutRequest) -> Result<(), CheckoutError> {
        request
            .validate()
            .map_err(|e| CheckoutError::ValidationError {
                message: format!("Checkout validation failed: {}", e),
            })?;

        if !request.discount.is_finite() || request.discount < 0.0 {
            return Err(CheckoutError::ValidationError {
                message: "Discount must be a non-negative amount".to_string(),
            });
        }

        if request.order_type.is_dine_in() {
            let table = request.table_number.unwrap_or(DEFAULT_TABLE_NUMBER);
            if table == 0 || table > self.settings.table_count {
                return Err(CheckoutError::ValidationError {
                    message: format!(
                        "Table number must be between 1 and {}",
                        self.settings.table_count
                    ),
                });
            }
        }

        Ok(())
    }
}
