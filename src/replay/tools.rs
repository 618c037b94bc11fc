//!
//! Activation of stored tool definitions for an outbound call.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capture::ToolDefinition;

/* --- types ----------------------------------------------------------------------------------- */

///
/// A function tool in the shape the model invocation capability consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    pub name: String,
    pub description: String,
    pub parameters_json_schema: Value,
    pub strict: bool,
}

///
/// Tool parameters for one outbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveToolParameters {
    pub function_tools: Vec<FunctionTool>,
    /** the model may answer with free text instead of a tool call */
    pub allow_text_output: bool,
}

/* --- start of code -------------------------------------------------------------------------- */

impl From<&ToolDefinition> for FunctionTool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters_json_schema: tool.parameters.clone(),
            strict: tool.strict.unwrap_or(false),
        }
    }
}

///
/// Turn canonical tools into active request parameters.
///
/// # Arguments
///  * `tools` - canonical tool definitions
///
/// # Returns
///  * `None` when there is no function tool, otherwise every function tool
///    with text output allowed; non-function tools are not callable and are skipped
pub fn activate_tools(tools: &[ToolDefinition]) -> Option<ActiveToolParameters> {
    let function_tools: Vec<FunctionTool> = tools
        .iter()
        .filter(|tool| {
            let callable = tool.is_function();
            if !callable {
                tracing::debug!("Skipping non-function tool '{}'", tool.name);
            }
            callable
        })
        .map(FunctionTool::from)
        .collect();

    if function_tools.is_empty() {
        return None;
    }
    Some(ActiveToolParameters { function_tools, allow_text_output: true })
}

/* --- tests ----------------------------------------------------------------------------------- */
