//! Data models for the application

mod view;

pub use view::*;
