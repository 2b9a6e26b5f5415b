pub mod cart_service;
pub mod checkout_service;
pub mod notifier;
pub mod payment;

pub use cart_service::*;
pub use checkout_service::*;
pub use notifier::*;
pub use payment::*;
