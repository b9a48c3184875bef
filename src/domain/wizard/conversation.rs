//! Conversation log shown to the user.
//!
//! Append-only during normal flow; entries render top-to-bottom in append
//! order. Truncation is only used to rewind on "go back".

use serde::{Deserialize, Serialize};

use crate::domain::foundation::EntryId;

use super::step::Step;

/// Who authored an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    pub id: EntryId,
    pub role: EntryRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_result: bool,
}

impl ConversationEntry {
    fn new(role: EntryRole, content: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            role,
            content: content.into(),
            options: None,
            is_result: false,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == EntryRole::User
    }
}

/// Ordered conversation entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding only the greeting for the initial step.
    pub fn seeded() -> Self {
        let mut log = Self::new();
        log.push_prompt(Step::initial());
        log
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> EntryId {
        self.push(ConversationEntry::new(EntryRole::User, content))
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> EntryId {
        self.push(ConversationEntry::new(EntryRole::Assistant, content))
    }

    /// Appends the prompt for `step`, with its options if it has any.
    pub fn push_prompt(&mut self, step: Step) -> EntryId {
        let mut entry = ConversationEntry::new(EntryRole::Assistant, step.prompt());
        entry.options = step
            .options()
            .map(|opts| opts.iter().map(|o| o.to_string()).collect());
        self.push(entry)
    }

    /// Appends an assistant entry flagged as part of a result.
    pub fn push_result(&mut self, content: impl Into<String>) -> EntryId {
        let mut entry = ConversationEntry::new(EntryRole::Assistant, content);
        entry.is_result = true;
        self.push(entry)
    }

    fn push(&mut self, entry: ConversationEntry) -> EntryId {
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Rewinds the log to `marker` entries.
    ///
    /// A user entry left dangling at the new end is dropped as well, so a
    /// rewind never leaves an answer without the prompt that followed it.
    pub fn rewind_to(&mut self, marker: usize) {
        self.entries.truncate(marker);
        if self.entries.len() > 1 && self.entries.last().is_some_and(|e| e.is_user()) {
            self.entries.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter()
    }
}
