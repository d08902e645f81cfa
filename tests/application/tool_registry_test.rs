use std::sync::Arc;

use async_trait::async_trait;
use colloquy::application::ports::{Tool, ToolError};
use colloquy::application::services::ToolRegistry;
use colloquy::domain::ToolCall;
use colloquy::infrastructure::tools::WeatherTool;
use serde_json::{Value, json};

struct EchoTool(&'static str);

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        self.0
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object" })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        Ok(input)
    }
}

fn call(name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: "call_0".to_string(),
        name: name.to_string(),
        arguments,
    }
}

#[test]
fn given_weather_tool_when_listing_specs_then_exposes_name_and_schema() {
    let registry = ToolRegistry::new().with_tool(Arc::new(WeatherTool));

    let specs = registry.specs();

    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].name, "weather");
    assert_eq!(
        specs[0].description,
        "Get the weather in a location (fahrenheit)"
    );
    assert_eq!(specs[0].parameters["required"], json!(["location"]));
}

#[test]
fn given_tool_with_same_name_when_registering_then_replaces_previous() {
    let registry = ToolRegistry::new()
        .with_tool(Arc::new(WeatherTool))
        .with_tool(Arc::new(EchoTool("echo")));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.specs()[0].description, "echo");
}

#[tokio::test]
async fn given_unknown_tool_when_executing_then_returns_unknown_tool_error() {
    let registry = ToolRegistry::new().with_tool(Arc::new(WeatherTool));

    let result = registry.execute(&call("stock_price", json!({}))).await;

    assert!(matches!(result, Err(ToolError::UnknownTool(name)) if name == "stock_price"));
}

#[tokio::test]
async fn given_registered_tool_when_executing_then_passes_arguments_through() {
    let registry = ToolRegistry::new().with_tool(Arc::new(EchoTool("echo")));

    let output = registry
        .execute(&call("weather", json!({ "location": "Lima" })))
        .await
        .expect("tool output");

    assert_eq!(output, json!({ "location": "Lima" }));
}
