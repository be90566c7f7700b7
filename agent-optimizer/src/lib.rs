// Dialogue state machine and the session that drives it
pub mod dialogue;
pub mod session;

// Follow-up chat about a finished analysis
pub mod chat;

// Graph derivation and histogram geometry
pub mod graph_builder;
pub mod histogram;

// Analysis service client and configuration
pub mod client;
pub mod config;

// Terminal front end
pub mod app;
pub mod ui;

pub mod cli;
pub mod logging;
pub mod utils;
