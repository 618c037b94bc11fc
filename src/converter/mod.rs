//!
//! Conversion of provider-native request fragments into canonical form.
//!
//! Each converter handles one kind of fragment and knows nothing about
//! capture envelopes or format detection.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- modules --------------------------------------------------------------------------------- */

pub mod messages;
pub mod schema;
pub mod tools;

/* --- start of code -------------------------------------------------------------------------- */

pub use messages::{CorrelationState, MessageConverter, Part, join_text_parts};
pub use schema::convert_schema;
pub use tools::{convert_gemini_tools, decode_openai_tools};
