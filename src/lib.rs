use std::collections::VecDeque;
use std::time::Duration;

use log::*;

pub use crate::{
    config::{DialogueConfig, SequenceConfig},
    errors::{DialogueError, Result},
    graph::{Choice, DialogueGraph, DialogueNode, NodeId},
    history::HistoryBuffer,
    logbook::{LogEntry, Logbook},
    progress::ProgressTracker,
    sequencer::{read_lines_csv, LineRecord, LineSequencer, SequenceEvent},
    surface::{ChoiceView, NullSurface, PowerGate, PowerSwitch, Surface},
    terminal::{Terminal, TerminalEvent},
    timer::Timer,
    typewriter::{RevealState, TypewriterScheduler, DEFAULT_TYPING_INTERVAL},
};

mod config;
mod errors;
mod graph;
mod history;
mod logbook;
mod progress;
mod sequencer;
mod surface;
mod terminal;
mod timer;
mod typewriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    /// The newest exchange finished typing out, naturally or by skip.
    RevealCompleted,
    /// A node without choices was reached.
    DialogueCompleted { node: NodeId },
    /// A requested node is missing from the graph. Nothing changed.
    NodeNotFound { node: NodeId },
    SurfaceClosed,
    /// The player accepted the end of the dialogue.
    ProceedRequested,
}

/// Walks a [`DialogueGraph`], keeping a short scrollback of exchanges and
/// typing the newest one out on the injected [`Surface`].
///
/// Time only moves when the host calls [`update`](Self::update).
pub struct DialogueEngine<S: Surface = NullSurface> {
    graph: DialogueGraph,
    config: DialogueConfig,
    progress: ProgressTracker,
    history: HistoryBuffer,
    typewriter: TypewriterScheduler,
    surface: S,
    power: Option<Box<dyn PowerGate>>,

    current_node: Option<NodeId>,
    /// Text shown above the reveal, already fully visible.
    static_text: String,
    current_choices: Vec<Choice>,
    choice_views: Vec<ChoiceView>,
    end_reached: bool,
    visible: bool,

    events: VecDeque<DialogueEvent>,
}

impl<S: Surface> DialogueEngine<S> {
    pub fn new(graph: DialogueGraph, config: DialogueConfig, surface: S) -> Self {
        Self {
            progress: ProgressTracker::new(&graph),
            history: HistoryBuffer::new(config.history_capacity),
            typewriter: TypewriterScheduler::new(config.typing_interval()),
            graph,
            config,
            surface,
            power: None,
            current_node: None,
            static_text: String::new(),
            current_choices: Vec::new(),
            choice_views: Vec::new(),
            end_reached: false,
            visible: false,
            events: VecDeque::new(),
        }
    }

    pub fn with_power_gate(mut self, gate: impl PowerGate + 'static) -> Self {
        self.power = Some(Box::new(gate));
        self
    }

    /// Enters the configured start node.
    pub fn start(&mut self) -> Result<()> {
        let start_node = self.config.start_node;
        info!("Starting dialogue at node {}", start_node);
        self.enter_node(start_node, "")
    }

    /// Shows `node_id` as a new exchange, quoting `player_choice` as the
    /// player's line.
    ///
    /// A missing node leaves everything as it was and is reported both as the
    /// returned error and as [`DialogueEvent::NodeNotFound`].
    pub fn enter_node(&mut self, node_id: NodeId, player_choice: &str) -> Result<()> {
        self.show_node(node_id, player_choice, false)
    }

    pub fn select_choice(&mut self, index: usize) -> Result<()> {
        let choice = match self.current_choices.get(index) {
            Some(choice) => choice.clone(),
            None => {
                let available = self.current_choices.len();
                warn!("Choice {} selected but only {} offered", index, available);
                return Err(DialogueError::InvalidChoice { index, available });
            }
        };

        debug!("Selected choice {}: {} -> {}", index, choice.text, choice.target_id);
        self.enter_node(choice.target_id, &choice.text)
    }

    /// Wipes the scrollback and replays the current node on its own.
    pub fn clear_history(&mut self) -> Result<()> {
        self.typewriter.reset();
        self.history.clear();
        self.static_text.clear();

        match self.current_node {
            Some(node_id) => self.show_node(node_id, "", true),
            None => {
                self.render();
                Ok(())
            }
        }
    }

    pub fn update(&mut self, dt: Duration) {
        if self.visible && !self.is_powered() {
            info!("Power lost, closing dialogue");
            self.close();
        }

        if !self.typewriter.is_typing() {
            return;
        }
        if self.typewriter.update(dt) {
            self.reveal_completed();
        }
        self.render();
    }

    pub fn skip_typing(&mut self) {
        if self.typewriter.skip_typing() {
            self.reveal_completed();
            self.render();
        }
    }

    /// Shows the surface, entering the start node the first time.
    pub fn open(&mut self) -> Result<()> {
        if !self.is_powered() {
            info!("No power, dialogue stays closed");
            return Err(DialogueError::PowerUnavailable);
        }

        self.visible = true;
        self.surface.set_visible(true);

        if self.current_node.is_none() {
            self.start()
        } else {
            self.render();
            Ok(())
        }
    }

    pub fn close(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.surface.set_visible(false);
        self.events.push_back(DialogueEvent::SurfaceClosed);
    }

    /// Leaves a finished dialogue. The scene transition itself is up to
    /// whoever handles [`DialogueEvent::ProceedRequested`].
    pub fn proceed(&mut self) -> Result<()> {
        if !self.end_reached {
            return Err(DialogueError::NotAtEnd);
        }

        info!("Proceeding from end node");
        self.close();
        self.events.push_back(DialogueEvent::ProceedRequested);
        Ok(())
    }

    pub fn poll_event(&mut self) -> Option<DialogueEvent> {
        self.events.pop_front()
    }

    /// The full composited text: the static scrollback followed by whatever
    /// has been revealed of the newest exchange.
    pub fn display_text(&self) -> String {
        let revealed = self.typewriter.displayed();
        if self.static_text.is_empty() {
            return revealed.to_string();
        }

        let mut text = String::with_capacity(
            self.static_text.len() + history::SEPARATOR.len() + revealed.len(),
        );
        text.push_str(&self.static_text);
        if !revealed.is_empty() {
            text.push_str(history::SEPARATOR);
            text.push_str(revealed);
        }
        text
    }

    pub fn progress(&self) -> f32 {
        self.progress.fraction(self.current_node)
    }

    pub fn choices(&self) -> &[ChoiceView] {
        &self.choice_views
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current_node
    }

    pub fn is_end_reached(&self) -> bool {
        self.end_reached
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_typing(&self) -> bool {
        self.typewriter.is_typing()
    }

    pub fn is_powered(&self) -> bool {
        self.power.as_ref().map_or(true, |gate| gate.is_available())
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn typewriter(&self) -> &TypewriterScheduler {
        &self.typewriter
    }

    pub fn graph(&self) -> &DialogueGraph {
        &self.graph
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// Switches between typing only the newest exchange under a static
    /// scrollback and redisplaying everything before typing the newest again.
    pub fn set_repeat_history_on_append(&mut self, repeat: bool) {
        self.config.repeat_history_on_append = repeat;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn show_node(&mut self, node_id: NodeId, player_choice: &str, replay: bool) -> Result<()> {
        let node = match self.graph.lookup(node_id) {
            Ok(node) => node.clone(),
            Err(err) => {
                warn!("Cannot enter node {}: {}", node_id, err);
                if let DialogueError::NodeNotFound(missing) = err {
                    self.events.push_back(DialogueEvent::NodeNotFound { node: missing });
                }
                return Err(err);
            }
        };

        debug!("Entering node {}", node_id);

        // Cancelled, not finished: no completion for the interrupted reveal.
        // Identical consecutive exchanges must still replay.
        self.typewriter.reset();

        let exchange = self.compose_exchange(player_choice, &node.text);
        self.history.append(exchange.clone());
        self.static_text = if self.config.repeat_history_on_append {
            self.history.render()
        } else {
            self.history.render_older()
        };

        self.current_node = Some(node_id);
        if self.typewriter.start_typing(&exchange) {
            self.reveal_completed();
        }

        let prefix = &self.config.choice_prefix;
        self.choice_views = node.choices.iter()
            .enumerate()
            .map(|(index, choice)| ChoiceView {
                index,
                label: format!("{}{}", prefix, choice.text),
                target: choice.target_id,
            })
            .collect();
        self.current_choices = node.choices;

        self.end_reached = self.current_choices.is_empty();
        if self.end_reached {
            if !replay {
                info!("Dialogue complete at node {}", node_id);
                self.events.push_back(DialogueEvent::DialogueCompleted { node: node_id });
            }
            self.surface.show_choices(&[]);
            self.surface.show_proceed();
        } else {
            self.surface.show_choices(&self.choice_views);
        }

        self.render();
        Ok(())
    }

    fn compose_exchange(&self, player_choice: &str, node_text: &str) -> String {
        let player_line = if player_choice.is_empty() {
            self.config.empty_choice_placeholder.as_deref()
        } else {
            Some(player_choice)
        };

        let mut exchange = String::new();
        if let Some(line) = player_line {
            exchange.push_str("> ");
            exchange.push_str(line);
            exchange.push('\n');
        }
        exchange.push_str(">> ");
        exchange.push_str(node_text);
        exchange
    }

    fn reveal_completed(&mut self) {
        self.events.push_back(DialogueEvent::RevealCompleted);
        self.surface.scroll_to_bottom();
    }

    fn render(&mut self) {
        let text = self.display_text();
        self.surface.render_text(&text);
    }
}
