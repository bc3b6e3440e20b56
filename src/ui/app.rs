use chrono::Local;

use crate::core::types::PhishResult;

/// Verdict a player can give for the URL on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Phish,
    Genuine,
    Quit,
}

impl Answer {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "p" | "phish" => Some(Answer::Phish),
            "n" | "no" | "g" | "genuine" => Some(Answer::Genuine),
            "q" | "quit" | "exit" => Some(Answer::Quit),
            _ => None,
        }
    }
}

/// Per-session tally; persisted progress lives in the progress machine.
pub struct Session {
    pub rounds: usize,
    pub correct: usize,
    pub logs: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            rounds: 0,
            correct: 0,
            logs: vec!["[SYSTEM] session started".to_string()],
        }
    }

    pub fn record(&mut self, result: PhishResult) {
        self.rounds += 1;
        if result.is_correct() {
            self.correct += 1;
        }
        self.log(format!("round {}: {}", self.rounds, result));
    }

    pub fn accuracy(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.correct as f64 / self.rounds as f64
        }
    }

    pub fn log(&mut self, msg: impl Into<String>) {
        self.logs
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S"), msg.into()));
        if self.logs.len() > 10 {
            self.logs.remove(0);
        }
    }
}
