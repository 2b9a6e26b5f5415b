pub mod local_storage;
pub mod repositories;

pub use local_storage::LocalStorage;
