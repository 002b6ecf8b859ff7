use crate::dom::Descriptor;
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the mark_page tool (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MarkPageParams {}

/// Tool that numbers the visible interactive elements of the active tab
#[derive(Default)]
pub struct MarkPageTool;

/// Data returned by [`MarkPageTool`]
pub fn marks_payload(descriptors: &[Descriptor]) -> serde_json::Value {
    serde_json::json!({
        "count": descriptors.len(),
        "elements": descriptors,
    })
}

impl Tool for MarkPageTool {
    type Params = MarkPageParams;

    fn name(&self) -> &str {
        "mark_page"
    }

    fn execute_typed(&self, _params: MarkPageParams, context: &mut ToolContext) -> Result<ToolResult> {
        let descriptors = context.session.mark_page()?;
        Ok(ToolResult::success_with(marks_payload(&descriptors)))
    }
}

/// Parameters for the unmark_page tool (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct UnmarkPageParams {}

/// Tool that removes the overlays drawn by [`MarkPageTool`]
#[derive(Default)]
pub struct UnmarkPageTool;

impl Tool for UnmarkPageTool {
    type Params = UnmarkPageParams;

    fn name(&self) -> &str {
        "unmark_page"
    }

    fn execute_typed(&self, _params: UnmarkPageParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.session.unmark_page()?;
        Ok(ToolResult::success())
    }
}
