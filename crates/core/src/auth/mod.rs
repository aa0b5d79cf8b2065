pub mod error;
pub mod port;
pub mod service;
