// Brandgen library: branded image generation proxy

pub mod compose;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod upstream;
