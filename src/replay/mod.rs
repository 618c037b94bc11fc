//!
//! Replay of stored captures.
//!
//! Rebuilds the outbound message list from a stored split plus overrides,
//! activates stored tools, sends the request through a `ModelInvoker` and
//! renders the model's answer for display.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- modules --------------------------------------------------------------------------------- */

pub mod executor;
pub mod messages;
pub mod plan;
pub mod response;
pub mod tools;

/* --- start of code -------------------------------------------------------------------------- */

pub use executor::{ExecutionRecord, ExecutionStatus, ModelInvoker, OutboundRequest, ReplayExecutor};
pub use messages::build_replay_messages;
pub use plan::{AgentDefaults, ExecutionPreview, ReplayOverrides, ReplayPlan};
pub use response::{
    EMPTY_RESPONSE_PLACEHOLDER, ModelResponse, ResponseMetadata, ResponsePart, format_response,
};
pub use tools::{ActiveToolParameters, FunctionTool, activate_tools};
