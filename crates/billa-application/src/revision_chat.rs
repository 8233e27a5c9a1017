//! Conversational revision of a settled split.

use billa_core::revision::{RevisionAssistant, RevisionContext, RevisionRequest, RevisionResult};
use billa_core::Result;
use billa_core::split::SplitLine;
use std::sync::Arc;

pub const GREETING: &str =
    "I have the current bill details. How would you like to modify the split?";
pub const CONNECTION_APOLOGY: &str = "Sorry, I had trouble connecting. Please try again.";

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Split proposed alongside this message, if any.
    pub splits: Option<Vec<SplitLine>>,
}

impl ChatMessage {
    fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
            splits: None,
        }
    }

    fn assistant(content: impl Into<String>, splits: Option<Vec<SplitLine>>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            splits,
        }
    }

    /// `"role: content"` line sent upstream as history.
    pub fn history_line(&self) -> String {
        format!("{}: {}", self.role.as_str(), self.content)
    }
}

/// A revision conversation about one settled split.
///
/// Every exchange is sent with the full prior transcript. The newest
/// assistant message carrying splits is the current proposal.
pub struct RevisionChat {
    assistant: Arc<dyn RevisionAssistant>,
    context: RevisionContext,
    receipt_data: String,
    messages: Vec<ChatMessage>,
}

impl RevisionChat {
    pub fn new(assistant: Arc<dyn RevisionAssistant>, context: RevisionContext) -> Result<Self> {
        let receipt_data = context.to_receipt_data()?;
        Ok(Self {
            assistant,
            context,
            receipt_data,
            messages: vec![ChatMessage::assistant(GREETING, None)],
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn context(&self) -> &RevisionContext {
        &self.context
    }

    /// Sends a user message and returns the assistant's reply.
    ///
    /// Blank input is ignored and yields `None`. Connection problems do not
    /// fail the call; an apology is appended instead so the user can retry.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let request = RevisionRequest {
            receipt_data: self.receipt_data.clone(),
            history: self.messages.iter().map(ChatMessage::history_line).collect(),
            user_message: text.to_string(),
        };
        self.messages.push(ChatMessage::user(text));

        let reply = match self.assistant.revise(&request).await {
            Ok(reply) => {
                let splits = reply.splits.filter(|lines| !lines.is_empty());
                ChatMessage::assistant(reply.reply, splits)
            }
            Err(e) => {
                tracing::warn!("[RevisionChat] Revision request failed: {}", e);
                ChatMessage::assistant(CONNECTION_APOLOGY, None)
            }
        };
        self.messages.push(reply);
        self.messages.last()
    }

    /// The newest proposed split and the reply that carried it.
    pub fn latest_proposal(&self) -> Option<(&[SplitLine], &str)> {
        self.messages.iter().rev().find_map(|message| {
            message
                .splits
                .as_deref()
                .map(|lines| (lines, message.content.as_str()))
        })
    }

    /// Consumes the chat, producing the payload to restore a settled session
    /// from. `None` when nothing was proposed.
    pub fn take_result(self) -> Option<RevisionResult> {
        let (split, reasoning) = self
            .latest_proposal()
            .map(|(lines, reply)| (lines.to_vec(), reply.to_string()))?;
        Some(self.context.into_result(split, reasoning))
    }
}
