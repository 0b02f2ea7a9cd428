mod client;
pub mod operations;
pub mod schema;

pub use client::ApiClient;
