use pretty_assertions::assert_eq;
use xpath_engine::{SseDecoder, SseMessage};

fn data(text: &str) -> SseMessage {
    SseMessage {
        event: None,
        id: None,
        data: text.to_string(),
    }
}

#[test]
fn decodes_events_split_across_chunks() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.feed(b"data: {\"status\":").is_empty());
    assert!(decoder.has_pending());
    assert!(decoder.feed(b"\"OK\"}\n").is_empty());
    let messages = decoder.feed(b"\ndata: second\n\n");

    assert_eq!(messages, vec![data(r#"{"status":"OK"}"#), data("second")]);
    assert!(!decoder.has_pending());
}

#[test]
fn handles_crlf_comments_and_multiline_data() {
    let mut decoder = SseDecoder::new();
    let messages = decoder.feed(b": keepalive 1\r\ndata: a\r\ndata:b\r\n\r\n: keepalive 2\n\n");
    assert_eq!(messages, vec![data("a\nb")]);
}

#[test]
fn utf8_sequence_split_between_chunks_is_preserved() {
    let text = "data: r\u{e9}seau\n\n".as_bytes();
    let split = text.iter().position(|byte| *byte == 0xC3).expect("multibyte start") + 1;
    let mut decoder = SseDecoder::new();
    assert!(decoder.feed(&text[..split]).is_empty());
    let messages = decoder.feed(&text[split..]);
    assert_eq!(messages, vec![data("r\u{e9}seau")]);
}

#[test]
fn event_type_and_id_are_reported() {
    let mut decoder = SseDecoder::new();
    let messages = decoder.feed(b"id: 7\nevent: ready\ndata: {}\n\ndata: next\n\n");
    assert_eq!(
        messages,
        vec![
            SseMessage {
                event: Some("ready".to_string()),
                id: Some("7".to_string()),
                data: "{}".to_string(),
            },
            SseMessage {
                event: None,
                id: Some("7".to_string()),
                data: "next".to_string(),
            },
        ]
    );
    assert!(!messages[0].is_default_event());
    assert!(messages[1].is_default_event());
}

#[test]
fn blank_lines_without_data_dispatch_nothing() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.feed(b"\n\nretry: 3000\n\nevent: ping\n\n").is_empty());
    // The event type does not leak into the next message.
    assert_eq!(decoder.feed(b"data: x\n\n"), vec![data("x")]);
}
