pub mod role_store;

pub use role_store::*;
