//! Remote collaborators: the workflow webhook and the messages backend
//!
//! Both are plain JSON-over-HTTP endpoints reached through one shared
//! reqwest client.

mod backend;
mod error;
mod types;
mod webhook;


pub use backend::ChatApi;
pub use error::{RemoteError, RemoteErrorKind};
pub use webhook::WebhookSender;

use reqwest::Client;
use std::time::Duration;

/// Build the HTTP client shared by the sender and the poller
pub fn http_client(timeout: Duration) -> Result<Client, RemoteError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteError::network(format!("Failed to create HTTP client: {e}")))
}
