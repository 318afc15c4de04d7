mod error;
pub mod ingest;
pub mod models;
pub mod ports;
pub mod services;

pub use error::*;
