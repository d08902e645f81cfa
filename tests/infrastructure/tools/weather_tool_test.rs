use colloquy::application::ports::{Tool, ToolError};
use colloquy::infrastructure::tools::{MAX_TEMPERATURE_F, MIN_TEMPERATURE_F, WeatherTool};
use serde_json::json;

#[tokio::test]
async fn given_location_when_executing_then_returns_location_and_temperature_in_range() {
    for _ in 0..50 {
        let output = WeatherTool
            .execute(json!({ "location": "New York" }))
            .await
            .expect("weather output");

        assert_eq!(output["location"], "New York");
        let temperature = output["temperature"].as_i64().expect("integer temperature");
        assert!((MIN_TEMPERATURE_F..=MAX_TEMPERATURE_F).contains(&temperature));
    }
}

#[tokio::test]
async fn given_missing_location_when_executing_then_returns_invalid_input() {
    let result = WeatherTool.execute(json!({ "city": "Oslo" })).await;

    assert!(matches!(result, Err(ToolError::InvalidInput(_))));
}

#[test]
fn given_weather_tool_when_describing_then_requires_location_string() {
    let schema = WeatherTool.parameters();

    assert_eq!(WeatherTool.name(), "weather");
    assert_eq!(schema["properties"]["location"]["type"], "string");
    assert_eq!(schema["required"], json!(["location"]));
}
