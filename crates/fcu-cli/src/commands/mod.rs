pub mod client;
pub mod config;
pub mod discover;
pub mod env;
pub mod import;
pub mod launch;
pub mod menus;
pub mod version;
