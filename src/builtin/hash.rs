//! `hash`: hex digest of text with md5 or sha256.

use crate::schema::Schema;
use crate::tool::{CallContext, ToolError};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Lowercase name, as echoed back to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn digest_hex(&self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Md5 => hex::encode(Md5::digest(data)),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ToolError;

    /// Case-insensitive; the empty string selects the default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" => Ok(HashAlgorithm::default()),
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" => Ok(HashAlgorithm::Sha256),
            _ => Err(ToolError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Arguments of `hash`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Schema)]
pub struct HashInput {
    #[schema(description = "Text to hash")]
    pub text: String,
    #[schema(
        description = "Hash algorithm (md5 or sha256)",
        one_of = "md5,sha256",
        error = "unsupported algorithm"
    )]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct HashOutput {
    /// Lowercase hex digest.
    pub hash: String,
    /// Algorithm actually used, lowercase.
    pub algorithm: String,
}

/// Hex digest of `input.text`; sha256 unless another algorithm is named.
pub fn hash(_ctx: &CallContext, input: HashInput) -> Result<HashOutput, ToolError> {
    let algorithm: HashAlgorithm = input.algorithm.as_deref().unwrap_or_default().parse()?;
    Ok(HashOutput {
        hash: algorithm.digest_hex(input.text.as_bytes()),
        algorithm: algorithm.as_str().to_string(),
    })
}
