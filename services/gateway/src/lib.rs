pub mod auth;
pub mod config;
pub mod platform;
pub mod proxy;
pub mod server;
