use colloquy::infrastructure::llm::SseLineDecoder;

#[test]
fn given_complete_lines_when_pushing_then_returns_data_payloads() {
    let mut decoder = SseLineDecoder::new();

    let payloads = decoder.push(b"data: {\"a\":1}\n\ndata: [DONE]\n\n");

    assert_eq!(payloads, vec!["{\"a\":1}".to_string(), "[DONE]".to_string()]);
}

#[test]
fn given_line_split_across_chunks_when_pushing_then_waits_for_newline() {
    let mut decoder = SseLineDecoder::new();

    assert!(decoder.push(b"data: {\"content\":").is_empty());
    let payloads = decoder.push(b"\"hi\"}\r\n");

    assert_eq!(payloads, vec!["{\"content\":\"hi\"}".to_string()]);
}

#[test]
fn given_comments_and_other_fields_when_pushing_then_ignores_them() {
    let mut decoder = SseLineDecoder::new();

    let payloads = decoder.push(b": keep-alive\nevent: message\nid: 7\ndata:x\n");

    assert_eq!(payloads, vec!["x".to_string()]);
}

#[test]
fn given_multibyte_char_split_across_chunks_when_pushing_then_reassembles_it() {
    let mut decoder = SseLineDecoder::new();
    let line = "data: 32°F\n".as_bytes();
    let split = line.iter().position(|b| *b == 0xC2).expect("degree sign") + 1;

    assert!(decoder.push(&line[..split]).is_empty());
    let payloads = decoder.push(&line[split..]);

    assert_eq!(payloads, vec!["32°F".to_string()]);
}

#[test]
fn given_trailing_line_without_newline_when_finishing_then_flushes_it() {
    let mut decoder = SseLineDecoder::new();
    decoder.push(b"data: last");

    assert_eq!(decoder.finish(), Some("last".to_string()));
    assert_eq!(decoder.finish(), None);
}
