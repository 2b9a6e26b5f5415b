use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;

use crate::models::{
    menu::MenuCategory as ModelMenuCategory,
    order::{OrderType as ModelOrderType, PaymentMethod as ModelPaymentMethod},
};

#[derive(Parser)]
#[command(name = "restaurant-cart")]
#[command(about = "Browse the menu, manage your cart and check out")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the saved cart (overrides CART_STORAGE_DIR)
    #[arg(long, global = true)]
    pub storage_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the menu
    Menu {
        /// Only show one category
        #[arg(short, long)]
        category: Option<MenuCategory>,
    },
    /// Add a menu item to the cart
    Add {
        /// Menu item ID
        id: String,
        /// Number of portions
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove an item from the cart
    Remove {
        /// Menu item ID
        id: String,
    },
    /// Set the quantity of an item in the cart (0 removes it)
    Update {
        /// Menu item ID
        id: String,
        /// New quantity
        quantity: u32,
    },
    /// Empty the cart
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show the cart
    Show,
    /// Place the order and print the bill
    Checkout(CheckoutArgs),
}

#[derive(clap::Args)]
pub struct CheckoutArgs {
    /// Customer name (prompted if missing)
    #[arg(short, long)]
    pub name: Option<String>,
    /// Customer phone number (prompted if missing)
    #[arg(short, long)]
    pub phone: Option<String>,
    /// Customer email
    #[arg(short, long)]
    pub email: Option<String>,
    /// Dine-in or takeaway
    #[arg(short = 't', long = "type", default_value = "dine-in")]
    pub order_type: OrderType,
    /// Table number for dine-in orders
    #[arg(long)]
    pub table: Option<u32>,
    /// Payment method
    #[arg(long, default_value = "cash")]
    pub payment: PaymentMethod,
    /// Discount amount taken off the bill
    #[arg(long, default_value_t = 0.0)]
    pub discount: f64,
    /// Special instructions for the kitchen
    #[arg(long)]
    pub notes: Option<String>,
    /// Print the order and bill as JSON instead of a receipt
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OrderType {
    DineIn,
    Takeaway,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::DineIn => write!(f, "dine-in"),
            OrderType::Takeaway => write!(f, "takeaway"),
        }
    }
}

impl From<OrderType> for ModelOrderType {
    fn from(value: OrderType) -> Self {
        match value {
            OrderType::DineIn => ModelOrderType::DineIn,
            OrderType::Takeaway => ModelOrderType::Takeaway,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ModelPaymentMethod::from(*self))
    }
}

impl From<PaymentMethod> for ModelPaymentMethod {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Cash => ModelPaymentMethod::Cash,
            PaymentMethod::Card => ModelPaymentMethod::Card,
            PaymentMethod::Upi => ModelPaymentMethod::Upi,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MenuCategory {
    Starters,
    MainCourse,
    Breads,
    Desserts,
    Beverages,
}

impl From<MenuCategory> for ModelMenuCategory {
    fn from(value: MenuCategory) -> Self {
        match value {
            MenuCategory::Starters => ModelMenuCategory::Starters,
            MenuCategory::MainCourse => ModelMenuCategory::MainCourse,
            MenuCategory::Breads => ModelMenuCategory::Breads,
            MenuCategory::Desserts => ModelMenuCategory::Desserts,
            MenuCategory::Beverages => ModelMenuCategory::Beverages,
        }
    }
}
