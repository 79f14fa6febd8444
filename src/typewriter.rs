//! Character-by-character text reveal.

use std::time::Duration;

use log::*;

use crate::timer::Timer;

pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RevealState {
    Idle,
    /// `cursor` is the byte length of the revealed prefix. It only grows.
    Revealing { cursor: usize },
    Completed,
}

/// Reveals one character of a target string per interval.
///
/// The displayed text is always a prefix of the target, so skipping is just a
/// jump of the cursor to the end. Every reveal that finishes, naturally or by
/// [`skip_typing`](Self::skip_typing), fires completion exactly once; calls
/// that fire it return `true`.
#[derive(Debug, Clone)]
pub struct TypewriterScheduler {
    interval: Duration,
    target: String,
    state: RevealState,
    ticker: Timer,
    completions: u64,
}

impl Default for TypewriterScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_INTERVAL)
    }
}

impl TypewriterScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            target: String::new(),
            state: RevealState::Idle,
            ticker: Timer::idle(),
            completions: 0,
        }
    }

    /// Starts revealing `text` from nothing, superseding any reveal in
    /// progress.
    ///
    /// Asking for the text that is already fully displayed does nothing.
    /// Empty text completes on the spot.
    pub fn start_typing(&mut self, text: &str) -> bool {
        if self.state == RevealState::Completed && self.target == text {
            debug!("Text already displayed, not restarting reveal");
            return false;
        }

        self.ticker.cancel();
        self.target.clear();
        self.target.push_str(text);

        if text.is_empty() {
            self.finish();
            return true;
        }

        debug!("Revealing {} characters", text.chars().count());
        self.state = RevealState::Revealing { cursor: 0 };
        self.ticker = Timer::repeating(self.interval);
        false
    }

    /// Jumps straight to the full text if a reveal is running.
    pub fn skip_typing(&mut self) -> bool {
        match self.state {
            RevealState::Revealing { .. } => {
                debug!("Skipping reveal");
                self.finish();
                true
            }
            _ => false,
        }
    }

    /// Drops the current reveal and its text without firing completion.
    pub fn reset(&mut self) {
        self.ticker.cancel();
        self.target.clear();
        self.state = RevealState::Idle;
    }

    pub fn update(&mut self, dt: Duration) -> bool {
        let mut cursor = match self.state {
            RevealState::Revealing { cursor } => cursor,
            _ => return false,
        };

        let ticks = self.ticker.advance(dt);
        for _ in 0..ticks {
            match self.target[cursor..].chars().next() {
                Some(c) => cursor += c.len_utf8(),
                None => break,
            }
            if cursor >= self.target.len() {
                break;
            }
        }

        if cursor >= self.target.len() {
            self.finish();
            true
        } else {
            self.state = RevealState::Revealing { cursor };
            false
        }
    }

    pub fn displayed(&self) -> &str {
        match self.state {
            RevealState::Idle => "",
            RevealState::Revealing { cursor } => &self.target[..cursor],
            RevealState::Completed => &self.target,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.state, RevealState::Revealing { .. })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect from the next `start_typing`.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Total completions fired over the scheduler's lifetime.
    pub fn completion_count(&self) -> u64 {
        self.completions
    }

    fn finish(&mut self) {
        self.ticker.cancel();
        self.state = RevealState::Completed;
        self.completions += 1;
    }
}
