//! # browser-marks
//!
//! Number the interactive elements of a live web page so an agent can target them by index.
//!
//! Marking finds every element that is both visible and interactive, draws a dashed outline
//! with an index label over each of its on-screen rectangles, and returns one [`Descriptor`]
//! per rectangle: its center point, tag type, text and accessible label.
//!
//! ## Features
//!
//! - **Element discovery**: occlusion-aware, viewport-clipped geometry with nested matches removed
//! - **Overlays**: numbered outlines that never intercept input, fully removable with unmark
//! - **Browser Session Management**: Launch or connect to Chrome/Chromium instances
//! - **MCP Server**: mark, unmark and capture tools for AI agents
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use browser_marks::{BrowserSession, LaunchOptions};
//!
//! # fn main() -> browser_marks::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://example.com")?;
//! session.wait_for_navigation()?;
//!
//! // One descriptor per marked rectangle
//! let marks = session.mark_page()?;
//! for mark in &marks {
//!     println!("{}", mark.to_simple_string());
//! }
//!
//! session.unmark_page()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Marking without a browser
//!
//! The marking pipeline runs against any [`PageHost`]. [`PageSnapshot`] is an in-memory page:
//!
//! ```rust
//! use browser_marks::dom::{Marker, PageSnapshot, SnapshotNode, Viewport};
//!
//! let mut page = PageSnapshot::new(Viewport::new(800.0, 600.0));
//! let body = page.push(SnapshotNode::new("BODY").with_rect(0.0, 0.0, 800.0, 600.0));
//! page.push(SnapshotNode::new("BUTTON").with_parent(body).with_rect(10.0, 10.0, 80.0, 30.0).with_text("Save"));
//!
//! let mut marker = Marker::new();
//! let marks = marker.mark(&mut page).unwrap();
//! assert_eq!(marks.len(), 1);
//! assert_eq!(marks[0].element_type, "button");
//! assert_eq!(page.overlay_count(), 1);
//!
//! marker.unmark(&mut page).unwrap();
//! assert_eq!(page.overlay_count(), 0);
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: Element discovery, overlays and the in-memory page host
//! - [`browser`]: Browser session management, configuration and the live-tab host
//! - [`tools`]: Tool system (navigate, mark_page, unmark_page, capture_marked)
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: **Model Context Protocol server** (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, CaptureOptions, ConnectionOptions, LaunchOptions, MarkedPage, TabHost};
pub use dom::{BoundingBox, Descriptor, Marker, PageHost, PageSnapshot, Viewport};
pub use error::{BrowserError, Result};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::BrowserServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
