use time::OffsetDateTime;
use uuid::Uuid;
use voice_engines::ChatMessage;

/// One user turn as transcribed text. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    text: String,
    received_at: OffsetDateTime,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn received_at(&self) -> OffsetDateTime {
        self.received_at
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Per-session state supplied by the runtime. The router only hands it to
/// the fallback.
#[derive(Debug, Clone)]
pub struct SessionContext {
    session_id: Uuid,
    history: Vec<ChatMessage>,
    max_history_messages: usize,
}

impl SessionContext {
    pub fn new(max_history_messages: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            history: Vec::new(),
            max_history_messages,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Append a completed turn, keeping only the newest messages.
    pub fn record_turn(&mut self, user: &str, assistant: &str) {
        self.history.push(ChatMessage::user(user));
        self.history.push(ChatMessage::assistant(assistant));
        self.trim_history();
    }

    /// Record an agent-initiated message such as the greeting.
    pub fn record_assistant(&mut self, assistant: &str) {
        self.history.push(ChatMessage::assistant(assistant));
        self.trim_history();
    }

    fn trim_history(&mut self) {
        if self.history.len() > self.max_history_messages {
            let drain_count = self.history.len() - self.max_history_messages;
            self.history.drain(0..drain_count);
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(20)
    }
}
