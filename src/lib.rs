pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod store;
