mod weather_tool;

pub use weather_tool::{MAX_TEMPERATURE_F, MIN_TEMPERATURE_F, WeatherTool};
