use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use eyre::{Result, eyre};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
}

/// Mutable per-session state, owned by the shell and passed explicitly
/// to the operations that read or update it.
pub struct SessionState {
    pub current_food: Option<String>,
    pub last_analyzed_food: Option<String>,
    pub last_food_quantity: f64,
    conversation: Vec<ConversationEntry>,
}

#[derive(Serialize)]
struct TranscriptFile<'a> {
    current_food: Option<&'a str>,
    last_analyzed_food: Option<&'a str>,
    last_food_quantity: f64,
    conversation: &'a [ConversationEntry],
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_food: None,
            last_analyzed_food: None,
            last_food_quantity: 1.0,
            conversation: Vec::new(),
        }
    }

    pub fn push_user(&mut self, content: &str) {
        self.conversation.push(ConversationEntry {
            role: Role::User,
            content: content.to_string(),
        });
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.conversation.push(ConversationEntry {
            role: Role::Assistant,
            content: content.to_string(),
        });
    }

    pub fn conversation(&self) -> &[ConversationEntry] {
        &self.conversation
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }

    /// Write the transcript as JSON into `dir` and return the new file's path.
    pub fn save_transcript(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|e| eyre!("Failed to create directory {}: {}", dir.display(), e))?;

        let filename = format!("conversation-{}.json", Utc::now().format("%Y%m%d-%H%M%S"));
        let path = dir.join(filename);

        let transcript = TranscriptFile {
            current_food: self.current_food.as_deref(),
            last_analyzed_food: self.last_analyzed_food.as_deref(),
            last_food_quantity: self.last_food_quantity,
            conversation: &self.conversation,
        };

        let json = serde_json::to_string_pretty(&transcript)?;
        fs::write(&path, json)
            .map_err(|e| eyre!("Failed to write to file {}: {}", path.display(), e))?;

        Ok(path)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_order_and_roles() {
        let mut session = SessionState::new();
        session.push_user("Is salmon healthy?");
        session.push_assistant("Yes, it is rich in omega-3.");

        let transcript = session.conversation();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].content, "Is salmon healthy?");
        assert_eq!(transcript[1].role, Role::Assistant);
    }

    #[test]
    fn clear_empties_a_non_empty_transcript() {
        let mut session = SessionState::new();
        session.push_user("hello");
        session.push_assistant("hi");
        assert!(!session.conversation().is_empty());

        session.clear_conversation();
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn save_transcript_writes_json() {
        let mut session = SessionState::new();
        session.last_analyzed_food = Some("Banana, raw".to_string());
        session.last_food_quantity = 2.0;
        session.push_user("How much potassium?");
        session.push_assistant("About 358 mg per 100 g.");

        let dir = std::env::temp_dir().join("foodgo-transcript-test");
        let path = session.save_transcript(&dir).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["last_analyzed_food"], "Banana, raw");
        assert_eq!(parsed["conversation"][0]["role"], "user");
        assert_eq!(parsed["conversation"][1]["role"], "assistant");

        fs::remove_file(path).ok();
    }
}
