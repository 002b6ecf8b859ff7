use crate::error::Result;
use crate::tools::mark::marks_payload;
use crate::tools::utils::normalize_url;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL to navigate to
    pub url: String,

    /// Wait for navigation to complete (default: true)
    #[serde(default = "default_wait")]
    pub wait_for_load: bool,

    /// Mark the page once loaded and return its elements (default: false)
    #[serde(default)]
    pub mark: bool,
}

fn default_wait() -> bool {
    true
}

/// Tool for navigating the active tab
#[derive(Default)]
pub struct NavigateTool;

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let url = normalize_url(&params.url);

        // Overlays belong to the old document and would be orphaned otherwise
        if let Err(e) = context.session.unmark_page() {
            log::debug!("Failed to unmark before navigating: {}", e);
        }
        context.session.navigate(&url)?;

        if params.wait_for_load || params.mark {
            context.session.wait_for_navigation()?;
        }

        let mut data = serde_json::json!({
            "original_url": params.url,
            "normalized_url": url,
        });

        if params.mark {
            let descriptors = context.session.mark_page()?;
            data["marks"] = marks_payload(&descriptors);
        }

        Ok(ToolResult::success_with(data))
    }
}
