//!
//! Tool declaration converter.
//!
//! Flattens Gemini-style `functionDeclarations` groups into canonical tool
//! definitions and decodes OpenAI-style tool lists, which are already canonical.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::Value;

use crate::capture::ToolDefinition;
use crate::converter::schema::convert_schema;
use crate::error::{ReplayError, Result};

/* --- start of code -------------------------------------------------------------------------- */

///
/// Convert Gemini tool groups into canonical tool definitions.
///
/// Every declaration of every group is emitted in input order, with its
/// `parameters` run through the schema type converter. Groups without a
/// declaration list (for example `googleSearch`) carry no callable function
/// and are skipped.
///
/// # Arguments
///  * `groups` - the request's `tools` array
///
/// # Returns
///  * flattened canonical tool list, empty for empty input
///  * `ReplayError::InvalidCapture` if a declaration has no name
pub fn convert_gemini_tools(groups: &[Value]) -> Result<Vec<ToolDefinition>> {
    let mut tools = Vec::new();

    for (group_index, group) in groups.iter().enumerate() {
        let declarations = group
            .get("functionDeclarations")
            .or_else(|| group.get("function_declarations"))
            .and_then(Value::as_array);

        let Some(declarations) = declarations else {
            tracing::warn!("Skipping tool group {} without function declarations", group_index);
            continue;
        };

        for (decl_index, decl) in declarations.iter().enumerate() {
            tools.push(convert_declaration(decl).map_err(|e| {
                ReplayError::InvalidCapture(format!(
                    "tools[{}].functionDeclarations[{}]: {}",
                    group_index, decl_index, e
                ))
            })?);
        }
    }

    Ok(tools)
}

///
/// Decode an OpenAI-style tool list without conversion.
///
/// Entries keep their captured wire form: a definition serializes back exactly
/// as it was recorded, whatever its tool type.
///
/// # Arguments
///  * `tools` - the request's `tools` array
///
/// # Returns
///  * canonical tool list
///  * `ReplayError::InvalidCapture` if an entry is not an object, or is a
///    function tool without a function name
pub fn decode_openai_tools(tools: &[Value]) -> Result<Vec<ToolDefinition>> {
    tools
        .iter()
        .enumerate()
        .map(|(index, tool)| {
            serde_json::from_value::<ToolDefinition>(tool.clone())
                .map_err(|e| ReplayError::InvalidCapture(format!("tools[{}]: {}", index, e)))
        })
        .collect()
}

/* --- helper functions ----------------------------------------------------------------------- */

fn convert_declaration(decl: &Value) -> std::result::Result<ToolDefinition, String> {
    let name = decl
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| "missing function name".to_string())?;

    let description = decl.get("description").and_then(Value::as_str).unwrap_or_default();
    let parameters = decl
        .get("parameters")
        .filter(|p| !p.is_null())
        .map(convert_schema)
        .unwrap_or_else(ToolDefinition::empty_parameters);

    Ok(ToolDefinition::new(name, description, parameters))
}

/* --- tests ----------------------------------------------------------------------------------- */
