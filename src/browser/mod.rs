//! Browser session management and configuration

pub mod config;
pub mod session;
pub mod tab_host;

pub use config::{CaptureOptions, ConnectionOptions, LaunchOptions};
pub use session::{BrowserSession, MarkedPage};
pub use tab_host::{OVERLAY_ATTRIBUTE, TabHost, TabOverlay};
