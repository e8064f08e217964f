pub mod api;
pub mod core;
pub mod service;
pub mod source;
