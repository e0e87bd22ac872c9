pub mod app_config;
pub mod session;
pub mod webhook;

pub use session::{FileSessionStore, MemorySessionStore};
pub use webhook::{WebhookClient, WebhookError};
