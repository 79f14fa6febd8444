use thiserror::Error;

use crate::graph::NodeId;

/// Errors reported by the dialogue runtime.
///
/// None of these are fatal. The runtime leaves its state untouched and hands
/// the error back so the caller can decide whether the player should see it.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// The requested node id is not in the loaded graph.
    #[error("no node with id {0} has been loaded")]
    NodeNotFound(NodeId),
    /// No nodes have been loaded at all.
    #[error("cannot enter a node: no nodes have been loaded")]
    EmptyGraph,
    /// A line sequence was started without any lines.
    #[error("cannot start an empty line sequence")]
    SequenceEmpty,
    /// A choice index outside the currently offered choices was selected.
    #[error("{index} is not a valid choice (expected a number below {available})")]
    InvalidChoice { index: usize, available: usize },
    /// The power gate refused to let the surface open.
    #[error("power is unavailable")]
    PowerUnavailable,
    /// `proceed` was called before a terminal node was reached.
    #[error("the dialogue has not reached an end node")]
    NotAtEnd,
    /// Two nodes in the loaded graph share an id.
    #[error("node id {0} is defined more than once")]
    DuplicateNode(NodeId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DialogueError>;
