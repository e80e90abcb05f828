use crate::stream::StreamEvent;
use axum::response::sse::Event;
use serde_json::{Map, Value};

/// Payload of the terminal `end` event
const END_DATA: &str = r#"{"reason":"session_closed"}"#;

/// Caption frames carry `{"text": ...}`
pub fn caption_event(event: StreamEvent) -> Event {
    to_event(event, "text")
}

/// Notes frames carry `{"note": ...}`
pub fn notes_event(event: StreamEvent) -> Event {
    to_event(event, "note")
}

fn to_event(event: StreamEvent, field: &str) -> Event {
    match event {
        StreamEvent::Delta(text) => {
            let mut body = Map::new();
            body.insert(field.to_string(), Value::String(text));
            Event::default().data(Value::Object(body).to_string())
        }
        StreamEvent::Keepalive => Event::default().comment("keepalive"),
        StreamEvent::End => Event::default().event("end").data(END_DATA),
    }
}
