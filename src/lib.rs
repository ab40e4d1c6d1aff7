pub mod config;
pub mod registry;
pub mod server;
pub mod tools;
pub mod vault;
