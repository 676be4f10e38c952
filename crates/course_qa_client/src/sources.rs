//! Citation payloads per displayed message, backing the source modal.

use std::collections::HashMap;

use crate::messages::Citation;
use crate::transcript::MessageId;

/// A chip referenced something the registry never stored. Chips are only
/// rendered together with their registry entry, so this is a rendering defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceLookupError {
    #[error("no sources registered for message {0}")]
    UnknownMessage(MessageId),
    #[error("message {message_id} has {len} sources, index {index} is out of range")]
    IndexOutOfRange {
        message_id: MessageId,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Default)]
pub struct SourceRegistry {
    entries: HashMap<MessageId, Vec<Citation>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the citation list shown for `message_id`. Empty lists are not
    /// stored since no chip can reference them.
    pub fn insert(&mut self, message_id: MessageId, citations: Vec<Citation>) {
        if !citations.is_empty() {
            self.entries.insert(message_id, citations);
        }
    }

    pub fn get(&self, message_id: MessageId, index: usize) -> Result<&Citation, SourceLookupError> {
        let citations = self
            .entries
            .get(&message_id)
            .ok_or(SourceLookupError::UnknownMessage(message_id))?;
        citations
            .get(index)
            .ok_or(SourceLookupError::IndexOutOfRange {
                message_id,
                index,
                len: citations.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
