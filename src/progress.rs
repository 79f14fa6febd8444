use crate::graph::{DialogueGraph, NodeId};

/// Completion fraction derived from where a node sits in the authored id
/// order. Walking back to a lower id lowers the fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTracker {
    max_id: NodeId,
}

impl ProgressTracker {
    pub fn new(graph: &DialogueGraph) -> Self {
        Self {
            max_id: graph.max_id(),
        }
    }

    pub fn fraction(&self, current: Option<NodeId>) -> f32 {
        match current {
            Some(id) if self.max_id > 0 => (id as f32 / self.max_id as f32).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}
