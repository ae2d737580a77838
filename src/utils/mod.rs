pub mod config;
pub mod session;

pub use config::{BrowserConfig, Config};
pub use session::{Artifact, SessionStore};
