use crate::protocol::models::Tool;
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type ToolHandler = Box<dyn Fn(Value) -> BoxFuture<Result<Value>> + Send + Sync>;

#[derive(Clone, Debug)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub schema: RootSchema,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub call_id: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub output: Value,
}

impl ToolResult {
    /// Output as the text handed back to the runtime. Strings are passed
    /// through as-is so the voice pipeline can speak them directly.
    #[must_use]
    pub fn output_text(&self) -> String {
        match &self.output {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// A callable function with a fixed name, description and argument schema.
///
/// Implementors are registered with [`ToolRegistry::register`], which derives
/// the parameter schema from `Args` once at startup.
#[async_trait]
pub trait ToolSpec: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send + 'static;
    type Output: Serialize + Send + 'static;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// Turn raw call arguments into `Args`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArguments`] if the arguments do not match `Args`.
    #[allow(clippy::result_large_err)]
    fn decode(&self, arguments: Value) -> Result<Self::Args> {
        decode_arguments(Self::NAME, arguments)
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output>;
}

/// Deserialize `arguments` for `tool`, reporting failures as
/// [`Error::InvalidArguments`].
///
/// # Errors
/// Returns an error if the arguments do not deserialize into `T`.
#[allow(clippy::result_large_err)]
pub fn decode_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Static table from external function name to handler and declared schema.
#[derive(Default)]
pub struct ToolRegistry {
    defs: Vec<ToolDefinition>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.defs
    }

    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.defs.iter().find(|def| def.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn tool<TArgs, TResp, F, Fut>(&mut self, name: &str, handler: F)
    where
        TArgs: DeserializeOwned + JsonSchema + Send + 'static,
        TResp: Serialize + Send + 'static,
        F: Fn(TArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TResp>> + Send + 'static,
    {
        self.insert_closure(name, None, handler);
    }

    pub fn tool_with_description<TArgs, TResp, F, Fut>(
        &mut self,
        name: &str,
        description: impl Into<String>,
        handler: F,
    )
    where
        TArgs: DeserializeOwned + JsonSchema + Send + 'static,
        TResp: Serialize + Send + 'static,
        F: Fn(TArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TResp>> + Send + 'static,
    {
        self.insert_closure(name, Some(description.into()), handler);
    }

    /// Register a [`ToolSpec`] implementation under its `NAME`.
    pub fn register<T: ToolSpec>(&mut self, spec: T) {
        let definition = ToolDefinition {
            name: T::NAME.to_string(),
            description: Some(T::DESCRIPTION.to_string()),
            schema: schemars::schema_for!(T::Args),
        };

        let spec = Arc::new(spec);
        let handler = move |value: Value| -> BoxFuture<Result<Value>> {
            let spec = Arc::clone(&spec);
            Box::pin(async move {
                let args = spec.decode(value)?;
                let resp = spec.call(args).await?;
                Ok(serde_json::to_value(resp)?)
            })
        };

        self.insert(definition, Box::new(handler));
    }

    fn insert_closure<TArgs, TResp, F, Fut>(&mut self, name: &str, description: Option<String>, handler: F)
    where
        TArgs: DeserializeOwned + JsonSchema + Send + 'static,
        TResp: Serialize + Send + 'static,
        F: Fn(TArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TResp>> + Send + 'static,
    {
        let definition = ToolDefinition {
            name: name.to_string(),
            description,
            schema: schemars::schema_for!(TArgs),
        };

        let tool_name = Arc::<str>::from(name);
        let user_handler = Arc::new(handler);
        let handler = move |value: Value| -> BoxFuture<Result<Value>> {
            let user_handler = Arc::clone(&user_handler);
            let tool_name = Arc::clone(&tool_name);
            Box::pin(async move {
                let args: TArgs = decode_arguments(&tool_name, value)?;
                let resp = user_handler(args).await?;
                Ok(serde_json::to_value(resp)?)
            })
        };

        self.insert(definition, Box::new(handler));
    }

    // Re-registering a name replaces both the handler and its definition.
    fn insert(&mut self, definition: ToolDefinition, handler: ToolHandler) {
        self.defs.retain(|def| def.name != definition.name);
        self.handlers.insert(definition.name.clone(), handler);
        self.defs.push(definition);
    }

    /// Convert all registered tools into protocol-level tool definitions.
    ///
    /// # Errors
    /// Returns an error if schema serialization fails.
    #[allow(clippy::result_large_err)]
    pub fn try_as_tools(&self) -> Result<Vec<Tool>> {
        self.defs
            .iter()
            .map(|def| -> Result<Tool> {
                Ok(Tool::Function {
                    name: def.name.clone(),
                    description: def.description.clone(),
                    parameters: serde_json::to_value(&def.schema)?,
                })
            })
            .collect()
    }

    /// Dispatch a tool call to the registered handler.
    ///
    /// # Errors
    /// Returns an error if the tool is unknown or execution fails.
    pub async fn dispatch(&self, call: ToolCall) -> Result<ToolResult> {
        let handler = self
            .handlers
            .get(&call.name)
            .ok_or_else(|| Error::UnknownTool(call.name.clone()))?;
        tracing::debug!(tool = %call.name, call_id = %call.call_id, "dispatching tool call");
        let output = handler(call.arguments).await.inspect_err(|err| {
            tracing::warn!(tool = %call.name, call_id = %call.call_id, error = %err, "tool call failed");
        })?;
        Ok(ToolResult { call_id: call.call_id, output })
    }

    /// Dispatch several calls concurrently. Results keep the order of `calls`.
    pub async fn dispatch_all(&self, calls: Vec<ToolCall>) -> Vec<Result<ToolResult>> {
        futures::future::join_all(calls.into_iter().map(|call| self.dispatch(call))).await
    }
}
