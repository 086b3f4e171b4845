use ob_domain::ChatMessage;
use parking_lot::RwLock;

/// Append-only chat history. Entries are never edited or removed.
#[derive(Debug, Default)]
pub struct ChatTranscript {
    messages: RwLock<Vec<ChatMessage>>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from messages fetched at startup, oldest first.
    pub fn with_history(history: Vec<ChatMessage>) -> Self {
        Self {
            messages: RwLock::new(history),
        }
    }

    pub fn append(&self, message: ChatMessage) {
        self.messages.write().push(message);
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<ChatMessage> {
        self.messages.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let t = ChatTranscript::with_history(vec![ChatMessage::assistant("hello")]);
        t.append(ChatMessage::user("hi"));
        let contents: Vec<_> = t.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["hello", "hi"]);
        assert_eq!(t.last().unwrap().content, "hi");
    }
}
