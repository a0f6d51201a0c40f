pub mod api;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod label;
pub mod models;
pub mod notify;
pub mod observability;
pub mod pricing;
pub mod state;
