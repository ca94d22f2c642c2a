//! `reverse`: reverse text by Unicode scalar value.

use crate::schema::Schema;
use crate::tool::{CallContext, ToolError};
use serde::{Deserialize, Serialize};

/// Arguments of `reverse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Schema)]
pub struct ReverseInput {
    #[schema(description = "Text to reverse")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct ReverseOutput {
    /// The text with its characters in reverse order.
    pub text: String,
}

/// Reverse the characters of `input.text`.
///
/// Multi-byte characters stay intact, so reversing twice is the identity.
pub fn reverse(_ctx: &CallContext, input: ReverseInput) -> Result<ReverseOutput, ToolError> {
    Ok(ReverseOutput {
        text: input.text.chars().rev().collect(),
    })
}
