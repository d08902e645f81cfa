mod weather_tool_test;
