pub mod bill;
pub mod cart;
pub mod menu;
pub mod order;

pub use bill::*;
pub use cart::*;
pub use menu::*;
pub use order::*;
