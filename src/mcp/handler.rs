use crate::browser::{BrowserSession, LaunchOptions};
use crate::tools::{ToolContext, ToolResult};
use rmcp::{
    ErrorData as McpError, ServerHandler, tool_handler,
    handler::server::router::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const INSTRUCTIONS: &str = "Browser page marking. Call browser_mark_page to number every visible \
interactive element. The returned list has one entry per boxed rectangle, in drawing order, with its \
center point (x, y), type, text and aria label; an element that wraps over several lines gets one \
entry per line under the same number. Call browser_unmark_page before acting on the page if the boxes would get \
in the way. browser_capture_marked returns a screenshot with the numbers drawn in.";

/// MCP server exposing page marking over one browser session
#[derive(Clone)]
pub struct BrowserServer {
    session: Arc<Mutex<BrowserSession>>,
    tool_router: ToolRouter<Self>,
}

impl BrowserServer {
    /// Launch a headless browser and serve it
    pub fn new() -> crate::error::Result<Self> {
        Self::with_options(LaunchOptions::default())
    }

    /// Launch a browser with the given options and serve it
    pub fn with_options(options: LaunchOptions) -> crate::error::Result<Self> {
        Ok(Self::with_session(BrowserSession::launch(options)?))
    }

    /// Serve an existing session
    pub fn with_session(session: BrowserSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    /// Lock the session; calls are served one at a time
    pub fn session(&self) -> MutexGuard<'_, BrowserSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn run_tool(&self, name: &str, params: serde_json::Value) -> std::result::Result<ToolResult, McpError> {
        let session = self.session();
        let mut context = ToolContext::new(&session);

        session
            .tool_registry()
            .execute(name, params, &mut context)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_handler]
impl ServerHandler for BrowserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}
