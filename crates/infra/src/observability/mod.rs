//! Logging bootstrap for applications embedding the client.

pub mod logging;

pub use logging::init_logging;
