//! Conversation size control.
//!
//! The completion service rejects oversized requests, so before every turn
//! the history is cut down to the system prompt plus the most recent user
//! and assistant messages. When the service still refuses, the history is
//! reset to the system prompt alone.

use clonekit_config::AgentConfig;
use clonekit_core::message::{Conversation, Message, Role};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPolicy {
    /// Bounding kicks in once the conversation holds more than this.
    pub max_messages: usize,
    pub keep_user: usize,
    pub keep_assistant: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            max_messages: 10,
            keep_user: 2,
            keep_assistant: 2,
        }
    }
}

impl From<&AgentConfig> for HistoryPolicy {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_messages: config.max_history_messages,
            keep_user: config.keep_user_messages,
            keep_assistant: config.keep_assistant_messages,
        }
    }
}

impl HistoryPolicy {
    /// Shrink an oversized conversation to
    /// `[system] + recent user messages + recent assistant messages`.
    ///
    /// Each group keeps its original relative order. Returns whether the
    /// conversation was rewritten.
    pub fn bound(&self, conversation: &mut Conversation) -> bool {
        let before = conversation.len();
        if before <= self.max_messages {
            return false;
        }

        let mut kept: Vec<Message> = conversation.system_message().cloned().into_iter().collect();
        kept.extend(most_recent(conversation, Role::User, self.keep_user));
        kept.extend(most_recent(conversation, Role::Assistant, self.keep_assistant));

        info!(before, after = kept.len(), "Message history truncated to manage size");
        conversation.replace_messages(kept);
        true
    }

    /// Drop everything but the system message.
    pub fn reset(&self, conversation: &mut Conversation) {
        let kept: Vec<Message> = conversation.system_message().cloned().into_iter().collect();
        info!(before = conversation.len(), "Message history reset to system prompt");
        conversation.replace_messages(kept);
    }
}

/// The last `keep` messages with `role`, oldest first.
fn most_recent(conversation: &Conversation, role: Role, keep: usize) -> Vec<Message> {
    let mut picked: Vec<Message> = conversation
        .messages()
        .iter()
        .filter(|m| m.role == role)
        .rev()
        .take(keep)
        .cloned()
        .collect();
    picked.reverse();
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(turns: usize) -> Conversation {
        let mut conv = Conversation::with_system("protocol");
        for i in 0..turns {
            conv.push(Message::user(format!("u{i}")));
            conv.push(Message::assistant(format!("a{i}")));
        }
        conv
    }

    fn contents(conv: &Conversation) -> Vec<&str> {
        conv.messages().iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn small_history_is_untouched() {
        let mut conv = conversation(4);
        assert_eq!(conv.len(), 9);
        assert!(!HistoryPolicy::default().bound(&mut conv));
        assert_eq!(conv.len(), 9);
    }

    #[test]
    fn exactly_at_limit_is_untouched() {
        let mut conv = conversation(4);
        conv.push(Message::user("extra"));
        assert_eq!(conv.len(), 10);
        assert!(!HistoryPolicy::default().bound(&mut conv));
    }

    #[test]
    fn oversized_history_keeps_recent_groups_in_order() {
        let mut conv = conversation(6);
        assert!(HistoryPolicy::default().bound(&mut conv));
        assert_eq!(contents(&conv), vec!["protocol", "u4", "u5", "a4", "a5"]);
        assert_eq!(conv.messages()[0].role, Role::System);
    }

    #[test]
    fn bounding_never_exceeds_five_messages() {
        for turns in 6..20 {
            let mut conv = conversation(turns);
            conv.push(Message::user("tail"));
            HistoryPolicy::default().bound(&mut conv);
            assert!(conv.len() <= 5, "{turns} turns left {} messages", conv.len());
        }
    }

    #[test]
    fn lopsided_history_keeps_what_exists() {
        let mut conv = Conversation::with_system("protocol");
        for i in 0..11 {
            conv.push(Message::assistant(format!("a{i}")));
        }
        HistoryPolicy::default().bound(&mut conv);
        assert_eq!(contents(&conv), vec!["protocol", "a9", "a10"]);
    }

    #[test]
    fn reset_keeps_only_system() {
        let mut conv = conversation(3);
        HistoryPolicy::default().reset(&mut conv);
        assert_eq!(contents(&conv), vec!["protocol"]);
    }

    #[test]
    fn policy_follows_config() {
        let config = AgentConfig {
            max_history_messages: 4,
            keep_user_messages: 1,
            keep_assistant_messages: 3,
            ..AgentConfig::default()
        };
        let policy = HistoryPolicy::from(&config);
        let mut conv = conversation(3);
        assert!(policy.bound(&mut conv));
        assert_eq!(contents(&conv), vec!["protocol", "u2", "a0", "a1", "a2"]);
    }
}
