pub mod claude;
pub mod codec;
pub mod config;
pub mod error;
pub mod examples;
pub mod models;
pub mod prompt;
pub mod routes;
pub mod session;
pub mod transport;

pub use claude::{AnalysisProvider, ClaudeClient};
pub use config::{Config, Credential};
pub use error::{AnalysisError, ErrorKind};
pub use routes::{router, AppState};
