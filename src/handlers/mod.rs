pub mod health;
pub mod response;
pub mod webhook;

pub use response::WebhookAck;
