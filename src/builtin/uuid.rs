//! `uuid`: random version 4 identifier.

use crate::schema::Schema;
use crate::tool::{CallContext, ToolError};
use ::uuid::Uuid;
use serde::{Deserialize, Serialize};

/// `uuid` takes no arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Schema)]
pub struct UuidInput {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct UuidOutput {
    /// Canonical hyphenated form, 36 characters.
    pub uuid: String,
}

/// Generate a random version 4 UUID.
pub fn generate_uuid(_ctx: &CallContext, _input: UuidInput) -> Result<UuidOutput, ToolError> {
    Ok(UuidOutput {
        uuid: Uuid::new_v4().hyphenated().to_string(),
    })
}
