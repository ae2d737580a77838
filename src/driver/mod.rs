pub mod http;
pub mod session;
pub mod traits;
pub mod web;

#[cfg(test)]
pub mod testing;

pub use http::{HttpProbe, ProbeResponse, ReqwestProbe};
pub use session::SessionGuard;
pub use traits::{BrowserSession, ElementRef, SessionLauncher};
pub use web::PlaywrightLauncher;
