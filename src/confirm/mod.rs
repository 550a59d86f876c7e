// src/confirm/mod.rs

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::config::ConfirmMode;

/// Answers yes/no questions put to the user.
///
/// Only an answer of "y" (any case, surrounding whitespace ignored) is
/// affirmative. Everything else, including empty input and EOF, declines.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Blocking prompt on the controlling terminal.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stdout = std::io::stdout();
        if write!(stdout, "{prompt} (y/N): ").and_then(|_| stdout.flush()).is_err() {
            return false;
        }
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&line),
        }
    }
}

/// Fixed answer for non-interactive embeddings.
pub struct AutoConfirmer {
    pub answer: bool,
}

impl Confirmer for AutoConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.answer, "auto-answered confirmation");
        self.answer
    }
}

pub fn confirmer_for(mode: ConfirmMode) -> Arc<dyn Confirmer> {
    match mode {
        ConfirmMode::Interactive => Arc::new(StdinConfirmer),
        ConfirmMode::AlwaysYes => Arc::new(AutoConfirmer { answer: true }),
        ConfirmMode::AlwaysNo => Arc::new(AutoConfirmer { answer: false }),
    }
}
