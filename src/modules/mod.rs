pub mod cell;
pub mod client;
pub mod config;
pub mod engine;
pub mod server;
pub mod session;
pub mod stats;
pub mod view;
pub mod world;
