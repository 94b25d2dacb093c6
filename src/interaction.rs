//! Side effects that need the user or the desktop: yes/no prompts and the
//! clipboard.

use std::collections::VecDeque;

/// Yes/no gate in front of destructive operations. Declining must leave all
/// state unchanged.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysConfirm(pub bool);

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Replays a fixed list of answers, then declines. Records the prompts it saw.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

/// Keeps the last copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
