mod mock_llm_client;
mod sse_line_decoder;
mod streaming_client;
mod tool_call_accumulator;

pub use mock_llm_client::{MockLlmClient, ScriptedLlmClient};
pub use sse_line_decoder::SseLineDecoder;
pub use streaming_client::{StreamingLlmClient, create_streaming_llm_client};
pub use tool_call_accumulator::ToolCallAccumulator;
