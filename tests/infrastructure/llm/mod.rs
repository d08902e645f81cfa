mod sse_line_decoder_test;
mod streaming_client_test;
