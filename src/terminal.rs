//! The in-world terminal that plays its boot sequence when switched on.

use std::collections::VecDeque;
use std::time::Duration;

use log::*;

use crate::errors::{DialogueError, Result};
use crate::sequencer::{LineSequencer, SequenceEvent};
use crate::surface::{NullSurface, PowerGate, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    Opened,
    Closed,
    /// The power gate cut the terminal off while it was open.
    PowerLost,
    Sequence(SequenceEvent),
}

pub struct Terminal<S: Surface = NullSurface> {
    sequencer: LineSequencer,
    surface: S,
    power: Option<Box<dyn PowerGate>>,
    active: bool,
    auto_start: bool,
    rendered: String,
    events: VecDeque<TerminalEvent>,
}

impl<S: Surface> Terminal<S> {
    pub fn new(sequencer: LineSequencer, mut surface: S, auto_start: bool) -> Self {
        surface.set_visible(false);
        Self {
            sequencer,
            surface,
            power: None,
            active: false,
            auto_start,
            rendered: String::new(),
            events: VecDeque::new(),
        }
    }

    pub fn with_power_gate(mut self, gate: impl PowerGate + 'static) -> Self {
        self.power = Some(Box::new(gate));
        self
    }

    pub fn is_powered(&self) -> bool {
        self.power.as_ref().map_or(true, |gate| gate.is_available())
    }

    /// Toggles the terminal. Refused while the power is off.
    ///
    /// Opening onto an empty boot sequence still opens the terminal, but the
    /// `SequenceEmpty` error is returned since nothing will ever play.
    pub fn interact(&mut self) -> Result<()> {
        if !self.is_powered() {
            info!("No power, terminal stays closed");
            return Err(DialogueError::PowerUnavailable);
        }

        if self.active {
            self.close();
            Ok(())
        } else {
            self.open()
        }
    }

    pub fn interaction_text(&self) -> &'static str {
        if self.is_powered() {
            "Access terminal [LMB]"
        } else {
            "WARNING: terminal offline"
        }
    }

    pub fn update(&mut self, dt: Duration) {
        if self.active && !self.is_powered() {
            info!("Power lost, closing terminal");
            self.events.push_back(TerminalEvent::PowerLost);
            self.close();
        }

        self.sequencer.update(dt);
        self.sync();
    }

    /// Finishes the current line and moves straight on to the next.
    pub fn skip(&mut self) {
        self.sequencer.force_next_line();
        self.sync();
    }

    pub fn poll_event(&mut self) -> Option<TerminalEvent> {
        self.events.pop_front()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sequencer(&self) -> &LineSequencer {
        &self.sequencer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn open(&mut self) -> Result<()> {
        debug!("Opening terminal");
        self.active = true;
        self.surface.set_visible(true);
        self.events.push_back(TerminalEvent::Opened);

        let started = if self.auto_start {
            self.sequencer.start_sequence()
        } else {
            Ok(())
        };
        self.rendered.clear();
        self.sync();
        started
    }

    fn close(&mut self) {
        debug!("Closing terminal");
        self.active = false;
        self.surface.set_visible(false);
        self.events.push_back(TerminalEvent::Closed);
    }

    fn sync(&mut self) {
        while let Some(event) = self.sequencer.poll_event() {
            self.events.push_back(TerminalEvent::Sequence(event));
        }

        if self.active && self.rendered != self.sequencer.displayed_text() {
            self.rendered.clear();
            self.rendered.push_str(self.sequencer.displayed_text());
            self.surface.render_text(&self.rendered);
        }
    }
}
