use std::collections::VecDeque;

/// Goes between entries when the scrollback is rendered.
pub(crate) const SEPARATOR: &str = "\n\n";

/// Bounded scrollback of rendered exchanges, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<String>,
    capacity: usize,
}

impl HistoryBuffer {
    /// A capacity of zero is treated as one; the newest exchange always has
    /// to fit.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, exchange: String) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(exchange);
    }

    /// Every retained entry, separated by a blank line.
    pub fn render(&self) -> String {
        join(self.entries.iter())
    }

    /// Everything but the newest entry.
    pub fn render_older(&self) -> String {
        let older = self.entries.len().saturating_sub(1);
        join(self.entries.iter().take(older))
    }

    pub fn newest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn join<'a>(entries: impl Iterator<Item = &'a String>) -> String {
    let mut out = String::new();
    for (i, entry) in entries.enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(entry);
    }
    out
}
