//! What the runtime needs from the outside world: somewhere to draw and a
//! power supply that can be cut.

use std::cell::Cell;
use std::rc::Rc;

use log::*;

use crate::graph::NodeId;

/// A choice as presented to the player. Activating it means calling
/// [`DialogueEngine::select_choice`](crate::DialogueEngine::select_choice)
/// with `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub index: usize,
    pub label: String,
    pub target: NodeId,
}

/// Presentation layer hooks. Every method defaults to doing nothing.
pub trait Surface {
    fn set_visible(&mut self, _visible: bool) {}

    /// Full text to show, replacing whatever was shown before.
    fn render_text(&mut self, _text: &str) {}

    /// Replaces the current set of choice controls.
    fn show_choices(&mut self, _choices: &[ChoiceView]) {}

    /// The dialogue has ended; offer a way to move on.
    fn show_proceed(&mut self) {}

    fn scroll_to_bottom(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {}

pub trait PowerGate {
    fn is_available(&self) -> bool;
}

/// Shared on/off switch. Clones observe and flip the same state.
#[derive(Debug, Clone)]
pub struct PowerSwitch {
    on: Rc<Cell<bool>>,
}

impl Default for PowerSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PowerSwitch {
    pub fn new(on: bool) -> Self {
        Self {
            on: Rc::new(Cell::new(on)),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    pub fn set_on(&mut self, on: bool) {
        self.on.set(on);
    }

    pub fn toggle(&mut self) -> bool {
        let on = !self.on.get();
        self.on.set(on);
        info!("Power switched {}", self.status_text());
        on
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_on() { "ONLINE" } else { "OFFLINE" }
    }

    pub fn interaction_text(&self) -> &'static str {
        if self.is_on() {
            "Cut power [LMB]"
        } else {
            "Restore power [LMB]"
        }
    }
}

impl PowerGate for PowerSwitch {
    fn is_available(&self) -> bool {
        self.is_on()
    }
}
