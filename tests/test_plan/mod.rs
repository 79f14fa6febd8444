use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;

use dotterm::{
    DialogueConfig, DialogueEngine, DialogueError, DialogueEvent, DialogueGraph, NodeId,
    NullSurface,
};

#[derive(Debug, PartialEq)]
pub enum PlanStep {
    Node(NodeId),
    Line(String),
    Option(String),
    Select(usize),
    NotFound(NodeId),
    Progress(f32),
    Clear,
    Stop,
}

impl PlanStep {
    fn new(line: &str) -> Self {
        let mut split_line = line.splitn(2, ": ");
        let step = split_line.next();
        let arg = split_line.next();
        match step {
            Some("node") => Self::Node(parse_arg(line, arg)),
            Some("line") => Self::Line(arg.unwrap().to_owned()),
            Some("option") => Self::Option(arg.unwrap().to_owned()),
            Some("select") => {
                let index: usize = parse_arg(line, arg);
                if index < 1 {
                    panic!("Select index must be 1 or greater.");
                }
                Self::Select(index - 1)
            }
            Some("not_found") => Self::NotFound(parse_arg(line, arg)),
            Some("progress") => Self::Progress(parse_arg(line, arg)),
            Some("clear") => Self::Clear,
            Some("stop") => Self::Stop,
            Some(step) => panic!(
                "Could not parse test plan step \"{}\" in line \"{}\"",
                step, line
            ),
            None => panic!("Could not parse test plan step in line \"{}\"", line),
        }
    }
}

fn parse_arg<T: std::str::FromStr>(line: &str, arg: Option<&str>) -> T {
    arg.and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| panic!("Bad argument in test plan line \"{}\"", line))
}

pub struct TestPlan {
    steps: Vec<PlanStep>,
}

impl TestPlan {
    pub fn load(plan_path: &Path) -> io::Result<Self> {
        let plan_text = fs::read_to_string(plan_path)?;
        let steps = plan_text
            .lines()
            .map(|line| line.trim_start())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(PlanStep::new)
            .collect();

        Ok(Self { steps })
    }
}

/// Walks a dialogue graph following a `.testplan` file that sits next to it.
///
/// Reveals are skipped as soon as they start, so only the traversal and the
/// scrollback are under test here.
pub struct PlanRunner {
    engine: DialogueEngine,
    plan: TestPlan,
}

impl PlanRunner {
    pub fn new(graph_path: &str) -> Self {
        let _ = pretty_env_logger::try_init();

        let graph_path = Path::new(graph_path);
        let graph = DialogueGraph::from_path(graph_path).unwrap();
        let plan = TestPlan::load(&graph_path.with_extension("testplan")).unwrap();

        Self {
            engine: DialogueEngine::new(graph, DialogueConfig::default(), NullSurface),
            plan,
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let Self { engine, plan } = self;
        engine.start()?;
        engine.skip_typing();

        let prefix = engine.config().choice_prefix.clone();
        let mut expected_options: Vec<String> = Vec::new();
        let mut last_selection: Option<dotterm::Result<()>> = None;

        for (i, step) in plan.steps.iter().enumerate() {
            let step_number = i + 1;
            match step {
                PlanStep::Node(id) => {
                    assert_eq!(
                        engine.current_node(),
                        Some(*id),
                        "[{}] Expected to be at node {}",
                        step_number,
                        id
                    );
                }
                PlanStep::Line(text) => {
                    let newest = engine.history().newest().unwrap_or_default();
                    assert!(
                        newest.lines().any(|line| line == text.as_str()),
                        "[{}] Expected the line {:?} in {:?}",
                        step_number,
                        text,
                        newest
                    );
                }
                PlanStep::Option(text) => {
                    expected_options.push(text.clone());
                }
                PlanStep::Select(index) => {
                    let offered: Vec<&str> = engine.choices().iter()
                        .map(|choice| choice.label.trim_start_matches(prefix.as_str()))
                        .collect();
                    assert_eq!(offered, expected_options, "[{}] Unexpected options", step_number);
                    expected_options.clear();

                    let result = engine.select_choice(*index);
                    engine.skip_typing();
                    last_selection = Some(result);
                }
                PlanStep::NotFound(id) => {
                    assert!(
                        matches!(last_selection, Some(Err(DialogueError::NodeNotFound(missing))) if missing == *id),
                        "[{}] Expected node {} to be missing, got {:?}",
                        step_number,
                        id,
                        last_selection
                    );
                    let reported = std::iter::from_fn(|| engine.poll_event())
                        .any(|event| event == DialogueEvent::NodeNotFound { node: *id });
                    assert!(reported, "[{}] NodeNotFound was not reported", step_number);
                }
                PlanStep::Progress(expected) => {
                    let progress = engine.progress();
                    assert!(
                        (progress - expected).abs() < 1e-4,
                        "[{}] Expected progress {}, got {}",
                        step_number,
                        expected,
                        progress
                    );
                }
                PlanStep::Clear => {
                    engine.clear_history()?;
                    engine.skip_typing();
                    assert_eq!(engine.history().len(), 1);
                }
                PlanStep::Stop => {
                    assert!(engine.is_end_reached(), "[{}] Expected the end", step_number);
                    let node = engine.current_node().unwrap();
                    let completed = std::iter::from_fn(|| engine.poll_event())
                        .filter(|event| *event == DialogueEvent::DialogueCompleted { node })
                        .count();
                    assert_eq!(completed, 1, "[{}] Expected one completion", step_number);
                }
            }
        }

        Ok(())
    }
}
