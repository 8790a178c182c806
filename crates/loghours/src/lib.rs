pub mod args;
pub mod config;
pub mod handlers;
pub mod server;
pub mod tasks;
