use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::cart::{Cart, CartLine};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
}

impl OrderType {
    pub fn is_dine_in(&self) -> bool {
        matches!(self, OrderType::DineIn)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::DineIn => write!(f, "dine-in"),
            OrderType::Takeaway => write!(f, "takeaway"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::Ready => write!(f, "ready"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Upi,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Upi => write!(f, "upi"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

lazy_static::lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").unwrap();
}

/// Customer-entered checkout details.
#[derive(Debug, Serialize, Deserialize, Clone, Validate, Default)]
pub struct CheckoutRequest {
    #[validate(length(max = 100, message = "Name must be less than 100 characters"))]
    #[validate(custom = "validate_required")]
    pub customer_name: String,

    #[validate(custom = "validate_required")]
    #[validate(regex(path = "PHONE_REGEX", message = "Invalid phone number"))]
    #[validate(custom = "validate_phone_digits")]
    pub phone: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub order_type: OrderType,

    pub table_number: Option<u32>,

    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub discount: f64,

    #[validate(length(max = 500, message = "Special instructions must be less than 500 characters"))]
    pub special_instructions: Option<String>,
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_phone_digits(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::new("phone_digit_count"));
    }
    Ok(())
}

impl CheckoutRequest {
    pub fn customer(&self) -> CustomerInfo {
        CustomerInfo {
            name: self.customer_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self
                .email
                .as_ref()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        }
    }
}

/// Immutable record of a submitted order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub lines: Vec<CartLine>,
    pub total: f64,
    pub customer: CustomerInfo,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Minutes until the kitchen expects the order to be ready.
    pub estimated_prep_time: u32,
    pub table_number: Option<u32>,
    pub special_instructions: Option<String>,
}

const BASE_PREP_MINUTES: u32 = 15;
const PREP_MINUTES_PER_UNIT: u32 = 2;
const MAX_PREP_MINUTES: u32 = 60;

impl Order {
    /// Snapshot the cart into a new pending order. Lines are copied by value.
    pub fn from_cart(
        cart: &Cart,
        customer: CustomerInfo,
        order_type: OrderType,
        table_number: Option<u32>,
        special_instructions: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lines: cart.lines().to_vec(),
            total: cart.total(),
            customer,
            order_type,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            estimated_prep_time: estimate_prep_time(cart.line_count()),
            table_number: if order_type.is_dine_in() {
                table_number
            } else {
                None
            },
            special_instructions: special_instructions
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

pub fn estimate_prep_time(units: u32) -> u32 {
    BASE_PREP_MINUTES
        .saturating_add(units.saturating_mul(PREP_MINUTES_PER_UNIT))
        .min(MAX_PREP_MINUTES)
}
