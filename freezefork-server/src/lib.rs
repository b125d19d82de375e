pub mod api;
pub mod seed;
pub mod store;
