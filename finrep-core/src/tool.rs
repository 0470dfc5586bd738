use crate::{ReadonlyContext, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// JSON schema for the arguments object, forwarded to the model as-is.
    fn parameters_schema(&self) -> Option<Value> {
        None
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value>;

    /// Function declaration advertised to the model.
    fn declaration(&self) -> Value {
        let mut decl = serde_json::json!({
            "name": self.name(),
            "description": self.description(),
        });
        if let Some(params) = self.parameters_schema() {
            decl["parameters"] = params;
        }
        decl
    }
}

#[async_trait]
pub trait ToolContext: ReadonlyContext {
    fn function_call_id(&self) -> &str;
}
