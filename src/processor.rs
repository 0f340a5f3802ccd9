//! Combine extracted text with the user's prompt and ask the completion service.

use anyhow::Result;

use crate::llm::{ChatMessage, Completion, Role};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that processes document content.";

const CONTENT_PREFIX: &str = "Here's the content from the document:";
const PROMPT_PREFIX: &str = "Please process this content according to the following prompt:";

/// The two-message conversation sent for one document.
///
/// The user message is a literal concatenation with no separators between
/// the fixed phrases, the document text and the prompt. Existing prompts were
/// written against this exact layout.
pub fn build_messages(text: &str, prompt: &str) -> Vec<ChatMessage> {
    let user = format!("{CONTENT_PREFIX}{text}{PROMPT_PREFIX}{prompt}");
    vec![ChatMessage::new(Role::System, SYSTEM_PROMPT), ChatMessage::new(Role::User, user)]
}

/// Submit one document's text and the prompt; return the raw reply text.
pub async fn process<C>(client: &C, text: &str, prompt: &str) -> Result<String>
where
    C: Completion + ?Sized,
{
    client.complete(build_messages(text, prompt)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl Completion for Recorder {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.seen.lock().unwrap().push(messages);
            Ok("raw reply".into())
        }
    }

    #[test]
    fn test_build_messages_layout() {
        let messages = build_messages("Invoice #7", "List the totals");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "Here's the content from the document:Invoice #7Please process this content according to the following prompt:List the totals"
        );
    }

    #[tokio::test]
    async fn test_process_returns_reply_unmodified() -> Result<()> {
        let recorder = Recorder::default();
        let reply = process(&recorder, "text", "prompt").await?;
        assert_eq!(reply, "raw reply");

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0][1].content.ends_with("prompt:prompt"));
        Ok(())
    }
}
