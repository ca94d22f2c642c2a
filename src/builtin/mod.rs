//! Built-in stateless tools.
//!
//! Each tool is a plain function over a typed input record. `echo`,
//! `reverse` and `hash` are deterministic; `uuid` and `timestamp` are not.

pub mod echo;
pub mod hash;
pub mod reverse;
pub mod timestamp;
pub mod uuid;

pub use echo::{echo, EchoInput, EchoOutput};
pub use hash::{hash, HashAlgorithm, HashInput, HashOutput};
pub use reverse::{reverse, ReverseInput, ReverseOutput};
pub use timestamp::{timestamp, TimestampFormat, TimestampInput, TimestampOutput};
pub use self::uuid::{generate_uuid, UuidInput, UuidOutput};

use crate::tool::{RegistryError, ToolRegistryBuilder};

/// Register all built-in tools.
pub fn register_builtin(builder: &mut ToolRegistryBuilder) -> Result<(), RegistryError> {
    builder
        .register_fn("echo", "Echo the provided text", echo)?
        .register_fn("reverse", "Reverse the provided text", reverse)?
        .register_fn("hash", "Hash the provided text with md5 or sha256", hash)?
        .register_fn("uuid", "Generate a random UUID (version 4)", generate_uuid)?
        .register_fn(
            "timestamp",
            "Current time as RFC3339, Unix seconds, or Unix milliseconds",
            timestamp,
        )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{CallContext, DispatchError, ToolRegistry};
    use serde_json::json;

    #[test]
    fn test_register_builtin() {
        let mut builder = ToolRegistry::builder();
        register_builtin(&mut builder).unwrap();
        let registry = builder.build();

        let names: Vec<_> = registry.list().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, ["echo", "hash", "reverse", "timestamp", "uuid"]);
    }

    #[test]
    fn test_register_builtin_twice_fails() {
        let mut builder = ToolRegistry::builder();
        register_builtin(&mut builder).unwrap();
        assert!(matches!(
            register_builtin(&mut builder),
            Err(RegistryError::Duplicate(name)) if name == "echo"
        ));
    }

    #[tokio::test]
    async fn test_rejected_values_use_tool_wording() {
        let mut builder = ToolRegistry::builder();
        register_builtin(&mut builder).unwrap();
        let registry = builder.build();
        let ctx = CallContext::default();

        let cases = [
            ("hash", json!({"text": "hello", "algorithm": "sha512"}), "sha512"),
            ("timestamp", json!({"format": "invalid"}), "invalid"),
        ];
        for (tool, arguments, value) in cases {
            let err = registry.dispatch(tool, arguments, &ctx).await.unwrap_err();
            let DispatchError::InvalidArguments { source, .. } = err else {
                panic!("expected invalid arguments for {}", tool);
            };

            // Same text a direct call produces.
            let direct = match tool {
                "hash" => value.parse::<HashAlgorithm>().unwrap_err(),
                _ => value.parse::<TimestampFormat>().unwrap_err(),
            };
            assert_eq!(source.to_string(), direct.to_string());
        }
    }
}
