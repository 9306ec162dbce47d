pub mod config;
pub mod error;
pub mod services;

pub use services::router;
