//! Error conversions for infrastructure dependencies.

pub mod conversions;

pub use conversions::{InfraError, IntoApiError};
