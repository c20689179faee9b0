pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod startup;
pub mod utils;

pub use app_state::AppState;
pub use config::{Config, SignatureConfig};
pub use error::ApiError;
pub use router::build_router;
pub use utils::signature::{verify_hmac_signature, SignatureError};
