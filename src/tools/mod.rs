pub mod notes;
pub mod time;

pub use notes::{NotesRequest, NotesTool};
pub use time::TimeTool;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::vault::NotesVault;

/// Tool trait for request-handling units exposed over HTTP.
///
/// Not object-safe (associated types). The registry works with
/// [`DynTool`], which every `Tool` with serde-compatible input and output
/// gets for free.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Type-erased tool: JSON parameters in, JSON result out.
#[async_trait::async_trait]
pub trait DynTool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;
    async fn call(&self, params: Value) -> Result<Value>;
}

#[async_trait::async_trait]
impl<T> DynTool for T
where
    T: Tool,
    T::Input: DeserializeOwned,
    T::Output: Serialize,
{
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }

    async fn call(&self, params: Value) -> Result<Value> {
        let input: T::Input = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidArgument(e.to_string()))?;
        let output = self.run(input).await?;
        Ok(serde_json::to_value(output)?)
    }
}

/// The tools this server ships with, in registration order.
pub fn builtin(vault: NotesVault) -> Vec<Arc<dyn DynTool>> {
    vec![
        Arc::new(TimeTool::new()),
        Arc::new(NotesTool::new(vault)),
    ]
}
