//! Authenticated HTTP client
//!
//! - [`client`]: [`HttpClient`] and its builder
//! - [`pipeline`]: named request stages composed by the client
//! - [`envelope`]: response envelope decoding
//! - [`transport`]: one attempt over `reqwest`
//! - [`refresher`]: the `/auth/refresh` transport used by the coordinator

pub mod client;
pub mod envelope;
pub mod pipeline;
pub mod refresher;
pub mod request;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder, NETWORK_ERROR_MESSAGE, NETWORK_ERROR_TITLE};
pub use envelope::{decode_as, decode_body};
pub use pipeline::{apply_retry, attach_auth, handle_auth_error, stamp_request};
pub use refresher::HttpTokenRefresher;
pub use request::PendingRequest;
pub use transport::Transport;
