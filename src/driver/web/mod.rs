pub mod driver;

pub use driver::{PlaywrightLauncher, WebSession};
