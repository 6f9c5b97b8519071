//! Chat transcript model.
//!
//! The transcript is append-only. The only mutation after insertion is
//! removing the loading placeholder once the real reply arrives.

pub const LOADING_TEXT: &str = "Thinking";
pub const NO_RESPONSE_TEXT: &str = "No response received";
pub const CLEARED_TEXT: &str = "Conversation cleared. How can I help you?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub is_loading: bool,
}

impl Message {
    /// Paragraphs of this message, each a list of lines.
    pub fn paragraphs(&self) -> Vec<Vec<&str>> {
        format_paragraphs(&self.text)
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
    /// Set on every insertion; the renderer scrolls to the end while it holds.
    pub stick_to_bottom: bool,
    pub scroll: u16,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) -> MessageId {
        self.insert(role, text.into(), false)
    }

    pub fn push_loading(&mut self) -> MessageId {
        self.insert(Role::Assistant, LOADING_TEXT.to_string(), true)
    }

    /// Remove a loading placeholder. Regular messages are never removed.
    pub fn remove_loading(&mut self, id: MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| !(m.id == id && m.is_loading));
        before != self.messages.len()
    }

    pub fn has_loading(&self) -> bool {
        self.messages.iter().any(|m| m.is_loading)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.scroll = 0;
        self.stick_to_bottom = true;
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == role && !m.is_loading)
            .count()
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.stick_to_bottom = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    fn insert(&mut self, role: Role, text: String, is_loading: bool) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message { id, role, text, is_loading });
        self.stick_to_bottom = true;
        id
    }
}

/// Split text into paragraphs on blank lines; single newlines stay as line
/// breaks inside a paragraph.
pub fn format_paragraphs(text: &str) -> Vec<Vec<&str>> {
    text.split("\n\n")
        .map(|paragraph| paragraph.split('\n').collect())
        .collect()
}
