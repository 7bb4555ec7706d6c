pub mod application;
pub mod commands;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod store;
