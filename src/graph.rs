//! Static dialogue data: nodes, their choices, and the graph that indexes them.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::*;
use serde::{Deserialize, Serialize};

use crate::errors::{DialogueError, Result};

pub type NodeId = u32;

/// A labelled edge to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(rename = "targetId")]
    pub target_id: NodeId,
}

impl Choice {
    pub fn new(text: impl Into<String>, target_id: NodeId) -> Self {
        Self {
            text: text.into(),
            target_id,
        }
    }
}

/// One line of terminal text plus the choices offered after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: NodeId,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl DialogueNode {
    pub fn new(id: NodeId, text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            id,
            text: text.into(),
            choices,
        }
    }

    /// A node without choices ends the dialogue.
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Read-only lookup table of every node in a dialogue.
///
/// Choices may point at ids that were never loaded. The graph does not reject
/// those; they surface as [`DialogueError::NodeNotFound`] when followed.
#[derive(Debug, Clone, Default)]
pub struct DialogueGraph {
    nodes: HashMap<NodeId, DialogueNode>,
    max_id: Option<NodeId>,
}

impl DialogueGraph {
    pub fn new(nodes: Vec<DialogueNode>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let id = node.id;
            if by_id.insert(id, node).is_some() {
                return Err(DialogueError::DuplicateNode(id));
            }
        }

        let graph = Self {
            max_id: by_id.keys().copied().max(),
            nodes: by_id,
        };

        for node in graph.nodes.values() {
            for choice in &node.choices {
                if !graph.contains(choice.target_id) {
                    warn!(
                        "Choice \"{}\" in node {} links to missing node {}",
                        choice.text, node.id, choice.target_id
                    );
                }
            }
        }

        Ok(graph)
    }

    pub fn from_json_str(src: &str) -> Result<Self> {
        let nodes: Vec<DialogueNode> = serde_json::from_str(src)?;
        Self::new(nodes)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let nodes: Vec<DialogueNode> = serde_json::from_reader(reader)?;
        Self::new(nodes)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn lookup(&self, id: NodeId) -> Result<&DialogueNode> {
        if self.nodes.is_empty() {
            return Err(DialogueError::EmptyGraph);
        }
        self.nodes.get(&id).ok_or(DialogueError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Largest id in the graph, or 1 when the graph is empty.
    pub fn max_id(&self) -> NodeId {
        self.max_id.unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
