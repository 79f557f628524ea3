//! Credential state shared by the HTTP client, the refresh coordinator and
//! the subscription channel.

pub mod token_store;

pub use token_store::TokenStore;
