use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::tools::{DynTool, ToolDescriptor};

/// Prefix under which every tool is mounted.
pub const TOOLS_PREFIX: &str = "/tools";

/// Configuration errors raised while building the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid tool name `{0}`: use ASCII letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("tool `{0}` is registered more than once")]
    DuplicateName(String),
}

/// Failures surfaced to a caller when invoking a tool.
///
/// The `Display` output is the message returned to HTTP clients.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Tool(anyhow::Error),

    #[error("tool '{0}' panicked")]
    Panicked(String),
}

#[derive(Clone)]
struct Entry {
    descriptor: ToolDescriptor,
    tool: Arc<dyn DynTool>,
}

/// One HTTP route: the mount path and the tool behind it.
#[derive(Clone)]
pub struct ToolBinding {
    pub path: String,
    pub descriptor: ToolDescriptor,
    pub tool: Arc<dyn DynTool>,
}

/// Tools registered by name from an explicit list.
///
/// [`ToolRegistry::bindings`] turns it into the `(path, tool)` pairs the HTTP
/// layer mounts.
pub struct ToolRegistry {
    tools: BTreeMap<String, Entry>,
}

impl ToolRegistry {
    /// Build a registry, rejecting malformed or duplicate tool names.
    pub fn new(tools: Vec<Arc<dyn DynTool>>) -> Result<Self, RegistryError> {
        let mut registered = BTreeMap::new();

        for tool in tools {
            let descriptor = tool.descriptor();
            if !is_valid_name(&descriptor.name) {
                return Err(RegistryError::InvalidName(descriptor.name));
            }
            if registered.contains_key(&descriptor.name) {
                return Err(RegistryError::DuplicateName(descriptor.name));
            }

            log::info!("Registered tool '{}'", descriptor.name);
            registered.insert(descriptor.name.clone(), Entry { descriptor, tool });
        }

        Ok(Self { tools: registered })
    }

    /// One binding per tool at `/tools/{name}`, ordered by name.
    pub fn bindings(&self) -> Vec<ToolBinding> {
        self.tools
            .values()
            .map(|entry| ToolBinding {
                path: format!("{}/{}", TOOLS_PREFIX, entry.descriptor.name),
                descriptor: entry.descriptor.clone(),
                tool: Arc::clone(&entry.tool),
            })
            .collect()
    }

    /// Invoke the tool registered under `name`.
    pub async fn dispatch(&self, name: &str, params: Value) -> Result<Value, DispatchError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
        invoke(Arc::clone(&entry.tool), params).await
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Run a tool on its own task so that a panic is contained to this call.
pub async fn invoke(tool: Arc<dyn DynTool>, params: Value) -> Result<Value, DispatchError> {
    let name = tool.descriptor().name;
    log::debug!("Invoking tool '{}'", name);

    match tokio::spawn(async move { tool.call(params).await }).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            log::warn!("Tool '{}' failed: {:#}", name, e);
            Err(DispatchError::Tool(e))
        }
        Err(join_error) => {
            log::error!("Tool '{}' panicked: {}", name, join_error);
            Err(DispatchError::Panicked(name))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_tools {
    use crate::tools::Tool;
    use anyhow::Result;
    use serde_json::Value;

    /// Returns its parameters unchanged.
    pub struct EchoTool(pub &'static str);

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        type Input = Value;
        type Output = Value;

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "echo"
        }

        async fn run(&self, input: Value) -> Result<Value> {
            Ok(input)
        }
    }

    /// Always fails with "disk error".
    pub struct FailingTool;

    #[async_trait::async_trait]
    impl Tool for FailingTool {
        type Input = Value;
        type Output = Value;

        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "fails"
        }

        async fn run(&self, _input: Value) -> Result<Value> {
            anyhow::bail!("disk error")
        }
    }

    pub struct PanickingTool;

    #[async_trait::async_trait]
    impl Tool for PanickingTool {
        type Input = Value;
        type Output = Value;

        fn name(&self) -> &str {
            "panicking"
        }

        fn description(&self) -> &str {
            "panics"
        }

        async fn run(&self, _input: Value) -> Result<Value> {
            panic!("boom")
        }
    }
}
