use chat_widget_model::{ChatRequest, Message, MessageKind, Role};
use serde::Serialize;

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct WireMessage {
    #[serde(rename = "type")]
    kind: MessageKind,
    content: String,
    role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatRequestBody {
    messages: Vec<WireMessage>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &ChatRequest) -> ChatRequestBody {
    ChatRequestBody {
        messages: req.messages.iter().map(create_message).collect(),
    }
}

#[inline]
fn create_message(msg: &Message) -> WireMessage {
    WireMessage {
        kind: msg.kind,
        content: msg.content.clone(),
        role: msg.role,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_request() {
        let request = ChatRequest {
            messages: vec![
                Message::user("Hello"),
                Message::assistant(MessageKind::ToolCalls, "search()", true),
            ],
        };
        let body = serde_json::to_value(create_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [
                    { "type": "text", "content": "Hello", "role": "user" },
                    {
                        "type": "tool_calls",
                        "content": "search()",
                        "role": "assistant"
                    },
                ]
            })
        );
    }
}
