mod tool_registry_test;
