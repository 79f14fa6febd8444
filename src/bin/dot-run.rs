use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use log::*;

use dotterm::{
    read_lines_csv, ChoiceView, DialogueConfig, DialogueEngine, DialogueError, DialogueEvent,
    DialogueGraph, LineSequencer, Logbook, NodeId, SequenceConfig, SequenceEvent, Surface,
    Terminal, TerminalEvent,
};

const FRAME: Duration = Duration::from_millis(16);
const USAGE: &str =
    "usage: dot-run <graph.json> [start_node] [--boot lines.csv] [--log log.csv] [--config config.json]";

/// Draws onto stdout, only printing what was appended since the last frame.
/// Anything else clears the screen first.
#[derive(Default)]
struct ConsoleSurface {
    shown: String,
}

impl Surface for ConsoleSurface {
    fn set_visible(&mut self, visible: bool) {
        if !visible && !self.shown.is_empty() {
            println!();
            println!("== Terminal closed ==");
        }
        self.shown.clear();
    }

    fn render_text(&mut self, text: &str) {
        match text.strip_prefix(self.shown.as_str()) {
            Some(appended) => print!("{}", appended),
            None => print!("\x1B[2J\x1B[H{}", text),
        }
        let _ = io::stdout().flush();
        self.shown.clear();
        self.shown.push_str(text);
    }
}

fn spawn_input() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

fn print_choices(choices: &[ChoiceView]) {
    println!();
    println!();
    println!("== Choose option ==");
    for choice in choices {
        println!("{}: {}", choice.index + 1, choice.label);
    }
}

fn run_boot(lines: Vec<String>, input: &Receiver<String>) -> Result<(), Box<dyn Error>> {
    let config = SequenceConfig {
        delay_between_lines_secs: 1.0,
        ..SequenceConfig::default()
    };
    let sequencer = LineSequencer::new(lines, &config);
    let mut terminal = Terminal::new(sequencer, ConsoleSurface::default(), config.auto_start);
    match terminal.interact() {
        Ok(()) => {}
        Err(DialogueError::SequenceEmpty) => {
            eprintln!("== Boot sequence is empty, skipping ==");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    let mut last = Instant::now();
    loop {
        thread::sleep(FRAME);
        let now = Instant::now();
        terminal.update(now - last);
        last = now;

        if input.try_recv().is_ok() {
            terminal.skip();
        }

        while let Some(event) = terminal.poll_event() {
            if let TerminalEvent::Sequence(SequenceEvent::Finished) = event {
                println!();
                return Ok(());
            }
        }
    }
}

fn run_dialogue(
    graph: DialogueGraph,
    config: DialogueConfig,
    input: &Receiver<String>,
) -> Result<(), Box<dyn Error>> {
    let mut engine = DialogueEngine::new(graph, config, ConsoleSurface::default());
    engine.open()?;

    let mut last = Instant::now();
    loop {
        thread::sleep(FRAME);
        let now = Instant::now();
        engine.update(now - last);
        last = now;

        if let Ok(line) = input.try_recv() {
            if engine.is_typing() {
                engine.skip_typing();
            } else if engine.is_end_reached() {
                engine.proceed()?;
            } else {
                match line.trim().parse::<usize>() {
                    Ok(selection) if selection > 0 => {
                        if let Err(err) = engine.select_choice(selection - 1) {
                            eprintln!("{}", err);
                        }
                    }
                    _ => eprintln!("Enter a choice number"),
                }
            }
        }

        while let Some(event) = engine.poll_event() {
            match event {
                DialogueEvent::RevealCompleted => {
                    if engine.is_end_reached() {
                        println!();
                        println!();
                        println!("== Dialogue complete. Press Enter ==");
                    } else {
                        print_choices(engine.choices());
                    }
                }
                DialogueEvent::NodeNotFound { node } => {
                    eprintln!("== Node {} is missing ==", node);
                }
                DialogueEvent::ProceedRequested | DialogueEvent::SurfaceClosed => {
                    return Ok(());
                }
                DialogueEvent::DialogueCompleted { node } => {
                    debug!("Reached end node {}", node);
                }
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let mut positional = Vec::new();
    let mut boot_path = None;
    let mut log_path = None;
    let mut config_path = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--boot" => boot_path = Some(args.next().ok_or(USAGE)?),
            "--log" => log_path = Some(args.next().ok_or(USAGE)?),
            "--config" => config_path = Some(args.next().ok_or(USAGE)?),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let graph_path = positional.next().ok_or(USAGE)?;
    let start_node: Option<NodeId> = positional.next()
        .map(|arg| arg.parse())
        .transpose()?;

    let mut config = match config_path {
        Some(path) => DialogueConfig::from_path(path)?,
        None => DialogueConfig::default(),
    };
    if let Some(start_node) = start_node {
        config.start_node = start_node;
    }

    let graph = DialogueGraph::from_path(&graph_path)?;
    if !graph.contains(config.start_node) {
        eprintln!("Could not find start node: {}", config.start_node);
        return Ok(());
    }

    let wants_boot = boot_path.is_some() || log_path.is_some();
    let mut boot_lines = match boot_path {
        Some(path) => {
            let file = File::open(path)?;
            read_lines_csv(file)?
        }
        None => Vec::new(),
    };
    if let Some(path) = log_path {
        boot_lines.extend(Logbook::from_csv_path(path)?.lines());
    }

    let input = spawn_input();
    if wants_boot {
        run_boot(boot_lines, &input)?;
    }
    run_dialogue(graph, config, &input)
}
