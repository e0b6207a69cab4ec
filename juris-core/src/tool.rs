//! Tools the model can call during generation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::llm::FunctionDeclaration;

/// A structured lookup exposed to the model as a function declaration.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object, if the tool takes any.
    fn parameters_schema(&self) -> Option<Value> {
        None
    }

    async fn execute(&self, args: Value) -> Result<Value>;

    /// The declaration sent to the model for this tool.
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
