//! Scripted, non-branching text: boot logs, warnings and the like.

use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use log::*;
use serde::Deserialize;

use crate::config::SequenceConfig;
use crate::errors::{DialogueError, Result};
use crate::timer::Timer;
use crate::typewriter::TypewriterScheduler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEvent {
    LineStarted { index: usize },
    LineCompleted { index: usize },
    /// A non-looping sequence ran out of lines.
    Finished,
}

/// One row of a scripted sequence CSV file.
#[derive(Debug, Deserialize)]
pub struct LineRecord {
    pub order: u32,
    pub text: String,
}

/// Reads `order,text` rows and returns the text sorted by `order`.
pub fn read_lines_csv<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = csv_reader.deserialize()
        .collect::<std::result::Result<Vec<LineRecord>, _>>()?;
    records.sort_by_key(|record| record.order);
    Ok(records.into_iter().map(|record| record.text).collect())
}

/// Plays a list of lines through a typewriter, one after another, pausing
/// between them.
#[derive(Debug, Clone)]
pub struct LineSequencer {
    lines: Vec<String>,
    index: usize,
    playing: bool,
    looping: bool,
    delay: Duration,
    delay_timer: Timer,
    typewriter: TypewriterScheduler,
    events: VecDeque<SequenceEvent>,
}

impl LineSequencer {
    pub fn new(lines: Vec<String>, config: &SequenceConfig) -> Self {
        Self {
            lines,
            index: 0,
            playing: false,
            looping: config.loop_sequence,
            delay: config.delay_between_lines(),
            delay_timer: Timer::idle(),
            typewriter: TypewriterScheduler::new(config.typing_interval()),
            events: VecDeque::new(),
        }
    }

    pub fn from_csv_path(path: impl AsRef<Path>, config: &SequenceConfig) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let lines = read_lines_csv(file)?;
        Ok(Self::new(lines, config))
    }

    pub fn start_sequence(&mut self) -> Result<()> {
        if self.lines.is_empty() {
            warn!("Not starting sequence: no lines");
            return Err(DialogueError::SequenceEmpty);
        }

        info!("Starting sequence of {} lines", self.lines.len());
        self.delay_timer.cancel();
        self.index = 0;
        self.playing = true;
        self.play_current_line();
        Ok(())
    }

    /// Finishes the current line at once and moves on without waiting out
    /// the delay.
    pub fn force_next_line(&mut self) {
        if !self.playing {
            debug!("Sequence not playing, nothing to skip");
            return;
        }

        if self.typewriter.skip_typing() {
            self.line_completed();
        }
        self.delay_timer.cancel();
        self.advance();
    }

    pub fn update(&mut self, dt: Duration) {
        if !self.playing {
            return;
        }

        if self.delay_timer.is_armed() {
            if self.delay_timer.advance(dt) > 0 {
                self.advance();
            }
            return;
        }

        if self.typewriter.update(dt) {
            self.line_completed();
        }
    }

    pub fn poll_event(&mut self) -> Option<SequenceEvent> {
        self.events.pop_front()
    }

    pub fn displayed_text(&self) -> &str {
        self.typewriter.displayed()
    }

    pub fn typewriter(&self) -> &TypewriterScheduler {
        &self.typewriter
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_waiting(&self) -> bool {
        self.delay_timer.is_armed()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn advance(&mut self) {
        self.index += 1;
        self.play_current_line();
    }

    fn play_current_line(&mut self) {
        if self.index >= self.lines.len() {
            if self.looping {
                debug!("Sequence wrapped around");
                self.index = 0;
            } else {
                info!("Sequence finished");
                self.playing = false;
                self.events.push_back(SequenceEvent::Finished);
                return;
            }
        }

        // Identical consecutive lines must still replay.
        self.typewriter.reset();
        self.events.push_back(SequenceEvent::LineStarted { index: self.index });
        if self.typewriter.start_typing(&self.lines[self.index]) {
            self.line_completed();
        }
    }

    fn line_completed(&mut self) {
        if !self.playing {
            return;
        }
        self.events.push_back(SequenceEvent::LineCompleted { index: self.index });
        // Replacing the timer drops any delay still pending.
        self.delay_timer = Timer::once(self.delay);
    }
}
