//! `echo`: return the text, optionally uppercased.

use crate::schema::Schema;
use crate::tool::{CallContext, ToolError};
use serde::{Deserialize, Serialize};

/// Arguments of `echo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Schema)]
pub struct EchoInput {
    #[schema(description = "Text to echo back")]
    pub text: String,
    #[schema(description = "Convert to uppercase?")]
    pub uppercase: Option<bool>,
}

/// Result of `echo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct EchoOutput {
    /// The echoed text.
    pub text: String,
}

/// Return `input.text`, uppercased when `uppercase` is set.
pub fn echo(_ctx: &CallContext, input: EchoInput) -> Result<EchoOutput, ToolError> {
    let text = if input.uppercase.unwrap_or(false) {
        input.text.to_uppercase()
    } else {
        input.text
    };
    Ok(EchoOutput { text })
}
