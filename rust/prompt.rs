use std::io::{self, BufRead, Write};

/// Text the operator must type before a permanent delete goes through.
pub const PERMANENT_DELETE_PHRASE: &str = "DELETE";

/// Confirmation source for destructive actions.
pub trait Prompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;

    /// Succeeds only when the typed answer equals `expected` exactly.
    fn confirm_text(&self, message: &str, expected: &str) -> bool;
}

/// Asks on stdin.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(question: &str) -> Option<String> {
        eprint!("{} ", question);
        io::stderr().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        Some(line.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        Self::ask(&format!("{} [y/N]", message))
            .map(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn confirm_text(&self, message: &str, expected: &str) -> bool {
        Self::ask(&format!("{} Type {} to confirm:", message, expected))
            .map(|answer| answer == expected)
            .unwrap_or(false)
    }
}

/// Pre-answered prompt, used for `--yes` / `--confirm` and in tests.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    pub approve: bool,
    pub typed: Option<String>,
}

impl Scripted {
    pub fn approve() -> Self {
        Self {
            approve: true,
            typed: None,
        }
    }

    pub fn deny() -> Self {
        Self::default()
    }

    pub fn typed(text: &str) -> Self {
        Self {
            approve: true,
            typed: Some(text.to_string()),
        }
    }
}

impl Prompt for Scripted {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, approved = self.approve, "Confirmation answered");
        self.approve
    }

    fn confirm_text(&self, _message: &str, expected: &str) -> bool {
        self.typed.as_deref() == Some(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_confirmation_is_exact() {
        assert!(Scripted::typed("DELETE").confirm_text("Gone?", PERMANENT_DELETE_PHRASE));
        assert!(!Scripted::typed("delete").confirm_text("Gone?", PERMANENT_DELETE_PHRASE));
        assert!(!Scripted::approve().confirm_text("Gone?", PERMANENT_DELETE_PHRASE));
    }
}
