use std::time::Duration;

use pretty_assertions::assert_eq;

use dotterm::{
    Choice, ChoiceView, DialogueConfig, DialogueEngine, DialogueError, DialogueEvent,
    DialogueGraph, DialogueNode, PowerSwitch, Surface,
};

mod test_plan;

#[derive(Debug, Default)]
struct Screen {
    visible: bool,
    text: String,
    choices: Vec<ChoiceView>,
    proceed_shown: bool,
    scrolls: usize,
}

impl Surface for Screen {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn render_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn show_choices(&mut self, choices: &[ChoiceView]) {
        self.choices = choices.to_vec();
    }

    fn show_proceed(&mut self) {
        self.proceed_shown = true;
    }

    fn scroll_to_bottom(&mut self) {
        self.scrolls += 1;
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn hello_bye() -> DialogueGraph {
    DialogueGraph::new(vec![
        DialogueNode::new(1, "Hello", vec![Choice::new("go", 2)]),
        DialogueNode::new(2, "Bye", Vec::new()),
    ])
    .unwrap()
}

fn set_up_engine(config: DialogueConfig) -> DialogueEngine<Screen> {
    let _ = pretty_env_logger::try_init();

    let config = DialogueConfig {
        typing_interval_secs: 0.01,
        ..config
    };
    DialogueEngine::new(hello_bye(), config, Screen::default())
}

fn events(engine: &mut DialogueEngine<Screen>) -> Vec<DialogueEvent> {
    std::iter::from_fn(|| engine.poll_event()).collect()
}

#[test]
fn test_branching() {
    let mut runner = test_plan::PlanRunner::new("test_files/Branching.json");
    runner.run().unwrap();
}

#[test]
fn test_dead_link() {
    let mut runner = test_plan::PlanRunner::new("test_files/DeadLink.json");
    runner.run().unwrap();
}

#[test]
fn test_clear_history_plan() {
    let mut runner = test_plan::PlanRunner::new("test_files/ClearHistory.json");
    runner.run().unwrap();
}

#[test]
fn test_hello_bye_history() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.start().unwrap();
    engine.skip_typing();
    engine.select_choice(0).unwrap();
    engine.skip_typing();

    let history: Vec<&str> = engine.history().entries().collect();
    assert_eq!(history, vec!["> (none)\n>> Hello", "> go\n>> Bye"]);
    assert!(engine.is_end_reached());
    assert_eq!(engine.progress(), 1.0);
    assert_eq!(engine.surface().text, "> (none)\n>> Hello\n\n> go\n>> Bye");
    assert!(engine.surface().proceed_shown);
    assert!(engine.surface().choices.is_empty());
}

#[test]
fn test_only_newest_exchange_types_out() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.start().unwrap();
    engine.skip_typing();
    engine.select_choice(0).unwrap();

    assert_eq!(engine.surface().text, "> (none)\n>> Hello");
    engine.update(ms(40));
    assert_eq!(engine.surface().text, "> (none)\n>> Hello\n\n> go");
    assert!(engine.is_typing());
}

#[test]
fn test_repeat_history_on_append() {
    let mut engine = set_up_engine(DialogueConfig {
        repeat_history_on_append: true,
        ..DialogueConfig::default()
    });
    engine.start().unwrap();
    engine.update(ms(20));
    assert_eq!(engine.surface().text, "> (none)\n>> Hello\n\n> ");

    engine.skip_typing();
    engine.select_choice(0).unwrap();
    engine.skip_typing();
    assert_eq!(
        engine.surface().text,
        "> (none)\n>> Hello\n\n> go\n>> Bye\n\n> go\n>> Bye"
    );
}

#[test]
fn test_history_is_bounded() {
    let graph = DialogueGraph::new(vec![
        DialogueNode::new(1, "Ping", vec![Choice::new("again", 1)]),
    ])
    .unwrap();
    let mut engine = DialogueEngine::new(graph, DialogueConfig::default(), Screen::default());
    engine.start().unwrap();
    for _ in 0..5 {
        engine.select_choice(0).unwrap();
    }
    engine.skip_typing();

    assert_eq!(engine.history().len(), 2);
    let history: Vec<&str> = engine.history().entries().collect();
    assert_eq!(history, vec!["> again\n>> Ping", "> again\n>> Ping"]);
}

#[test]
fn test_looping_choice_reveals_each_time() {
    let graph = DialogueGraph::new(vec![
        DialogueNode::new(1, "Hello", vec![Choice::new("stay", 1)]),
    ])
    .unwrap();
    let mut engine = DialogueEngine::new(graph, DialogueConfig::default(), Screen::default());
    engine.start().unwrap();
    engine.skip_typing();
    events(&mut engine);

    for round in 1..=2 {
        engine.select_choice(0).unwrap();
        assert!(engine.is_typing(), "round {} did not start a reveal", round);
        engine.update(Duration::from_secs(5));
        assert!(!engine.is_typing());
        assert_eq!(events(&mut engine), vec![DialogueEvent::RevealCompleted]);
    }

    assert_eq!(engine.surface().scrolls, 3);
    assert_eq!(engine.surface().text, "> stay\n>> Hello\n\n> stay\n>> Hello");
}

#[test]
fn test_natural_completion_fires_once() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.start().unwrap();
    for _ in 0..100 {
        engine.update(ms(10));
    }
    engine.skip_typing();

    assert_eq!(engine.surface().text, "> (none)\n>> Hello");
    assert_eq!(engine.surface().scrolls, 1);
    assert_eq!(events(&mut engine), vec![DialogueEvent::RevealCompleted]);
}

#[test]
fn test_missing_node_leaves_state_alone() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.start().unwrap();
    engine.update(ms(30));
    let text_before = engine.surface().text.clone();

    assert!(matches!(engine.enter_node(42, "lost"), Err(DialogueError::NodeNotFound(42))));
    assert_eq!(engine.current_node(), Some(1));
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.surface().text, text_before);
    assert!(engine.is_typing());
    assert_eq!(events(&mut engine), vec![DialogueEvent::NodeNotFound { node: 42 }]);
}

#[test]
fn test_empty_graph() {
    let mut engine = DialogueEngine::new(
        DialogueGraph::default(),
        DialogueConfig::default(),
        Screen::default(),
    );
    assert!(matches!(engine.start(), Err(DialogueError::EmptyGraph)));
    assert_eq!(engine.progress(), 0.0);
    assert_eq!(engine.current_node(), None);
    assert!(engine.history().is_empty());
}

#[test]
fn test_clear_history_replays_current_node() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.start().unwrap();
    engine.skip_typing();
    engine.select_choice(0).unwrap();
    engine.skip_typing();
    events(&mut engine);

    engine.clear_history().unwrap();
    assert_eq!(engine.current_node(), Some(2));
    assert_eq!(engine.history().len(), 1);
    assert!(engine.is_typing());

    engine.skip_typing();
    assert_eq!(engine.surface().text, "> (none)\n>> Bye");
    assert_eq!(events(&mut engine), vec![DialogueEvent::RevealCompleted]);
}

#[test]
fn test_dialogue_completed_once_per_terminal_node() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.start().unwrap();
    engine.select_choice(0).unwrap();
    engine.skip_typing();

    assert_eq!(
        events(&mut engine),
        vec![
            DialogueEvent::DialogueCompleted { node: 2 },
            DialogueEvent::RevealCompleted,
        ]
    );
}

#[test]
fn test_power_loss_closes_surface() {
    let mut power = PowerSwitch::default();
    let mut engine = set_up_engine(DialogueConfig::default()).with_power_gate(power.clone());

    engine.open().unwrap();
    assert!(engine.surface().visible);
    assert_eq!(engine.current_node(), Some(1));
    engine.update(ms(20));

    power.set_on(false);
    engine.update(ms(10));
    assert!(!engine.is_visible());
    assert!(!engine.surface().visible);
    // The reveal carries on behind the closed surface.
    assert!(engine.is_typing());
    assert!(events(&mut engine).contains(&DialogueEvent::SurfaceClosed));

    assert!(matches!(engine.open(), Err(DialogueError::PowerUnavailable)));

    power.set_on(true);
    engine.open().unwrap();
    assert_eq!(engine.current_node(), Some(1));
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn test_proceed_only_at_end() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.open().unwrap();
    assert!(matches!(engine.proceed(), Err(DialogueError::NotAtEnd)));

    engine.select_choice(0).unwrap();
    engine.proceed().unwrap();
    assert!(!engine.surface().visible);

    let events = events(&mut engine);
    assert_eq!(
        &events[events.len() - 2..],
        &[DialogueEvent::SurfaceClosed, DialogueEvent::ProceedRequested][..]
    );
}

#[test]
fn test_choice_surface_wiring() {
    let mut engine = set_up_engine(DialogueConfig::default());
    engine.start().unwrap();
    assert_eq!(
        engine.surface().choices,
        vec![ChoiceView { index: 0, label: "▶ go".to_string(), target: 2 }]
    );

    let index = engine.surface().choices[0].index;
    engine.select_choice(index).unwrap();
    assert_eq!(engine.current_node(), Some(2));
}
