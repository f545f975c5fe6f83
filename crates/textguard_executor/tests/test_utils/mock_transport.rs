//! Mock analysis transport for testing.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use textguard_core::ChatPayload;
use textguard_error::HttpError;
use textguard_models::{AnalysisTransport, TransportResponse};

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond with this status and body
    Respond {
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    },
    /// Fail at the transport level
    Fail(String),
    /// Wait, then give the inner reply
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    /// 200 with a chat completion carrying `content`.
    pub fn ok(content: &str) -> Self {
        Self::status(200, completion(content))
    }

    /// Any status with a raw body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Respond {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// 429, optionally with a Retry-After hint.
    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self::Respond {
            status: 429,
            body: r#"{"error": "rate limit exceeded"}"#.to_string(),
            retry_after,
        }
    }

    /// Transport failure.
    pub fn fail(message: &str) -> Self {
        Self::Fail(message.to_string())
    }

    /// This reply, after `delay`.
    pub fn after(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// Chat-completions body whose first choice says `content`.
pub fn completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

type Responder = Box<dyn Fn(&str, usize) -> MockReply + Send + Sync>;

/// Mock transport with a call counter.
///
/// Replies either follow a fixed sequence (the last reply repeats once the
/// sequence runs out) or are computed from the submitted text.
pub struct MockTransport {
    responder: Responder,
    calls: AtomicUsize,
    last_payload: Mutex<Option<ChatPayload>>,
}

impl MockTransport {
    /// Replies in order, repeating the last one.
    pub fn sequence(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "mock needs at least one reply");
        Self::from_fn(move |_, call| replies[call.min(replies.len() - 1)].clone())
    }

    /// Always the same reply.
    pub fn always(reply: MockReply) -> Self {
        Self::sequence(vec![reply])
    }

    /// Reply computed from the submitted text and the 0-based call number.
    pub fn from_fn(f: impl Fn(&str, usize) -> MockReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(f),
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    /// Number of times `call` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent payload received.
    pub fn last_payload(&self) -> Option<ChatPayload> {
        self.last_payload.lock().unwrap().clone()
    }
}

/// Recovers the submitted text from the user message.
fn submitted_text(payload: &ChatPayload) -> &str {
    payload
        .messages
        .last()
        .and_then(|message| message.content.split_once(": "))
        .map(|(_, text)| text)
        .unwrap_or_default()
}

#[async_trait]
impl AnalysisTransport for MockTransport {
    async fn call(&self, payload: &ChatPayload) -> Result<TransportResponse, HttpError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        let mut reply = (self.responder)(submitted_text(payload), call);

        loop {
            match reply {
                MockReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                MockReply::Respond {
                    status,
                    body,
                    retry_after,
                } => {
                    return Ok(TransportResponse {
                        status,
                        body,
                        retry_after,
                    });
                }
                MockReply::Fail(message) => return Err(HttpError::new(message)),
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
