use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::application::ports::{Tool, ToolError};

pub const MIN_TEMPERATURE_F: i64 = 32;
pub const MAX_TEMPERATURE_F: i64 = 90;

#[derive(Debug, Deserialize)]
struct WeatherInput {
    location: String,
}

#[derive(Debug, Serialize)]
struct WeatherOutput {
    location: String,
    temperature: i64,
}

/// Demo tool: echoes the location with a random Fahrenheit temperature.
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get the weather in a location (fahrenheit)"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get the weather for"
                }
            },
            "required": ["location"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: WeatherInput =
            serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;

        let temperature = rand::thread_rng().gen_range(MIN_TEMPERATURE_F..=MAX_TEMPERATURE_F);

        serde_json::to_value(WeatherOutput {
            location: input.location,
            temperature,
        })
        .map_err(|e| ToolError::ExecutionFailed(e.to_string()))
    }
}
