//! The D.O.T. system log: structured log records shown in panels, as one full
//! record, or played line by line through a [`LineSequencer`](crate::LineSequencer).

use std::io::Read;
use std::path::Path;

use log::*;
use serde::Deserialize;

use crate::errors::Result;

const FULL_LOG_HEADER: &str = "[D.O.T. SYSTEM LOG - FULL RECORD]";
const SUMMARY_CHARS: usize = 20;

/// One row of a log CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "logID")]
    pub log_id: String,
    #[serde(rename = "displayOrder")]
    pub display_order: u32,
    pub timestamp: String,
    #[serde(rename = "operatorID")]
    pub operator_id: String,
    #[serde(rename = "logType")]
    pub log_type: String,
    #[serde(rename = "eventDescription")]
    pub event_description: String,
    #[serde(rename = "dataSummary", default)]
    pub data_summary: String,
    #[serde(rename = "isCriticalLog", default)]
    pub is_critical: bool,
    #[serde(rename = "showInPanel", default = "shown")]
    pub show_in_panel: bool,
}

fn shown() -> bool {
    true
}

impl LogEntry {
    /// `hh:mm:ss` out of a `yyyy-mm-dd hh:mm:ss` timestamp.
    fn clock(&self) -> Option<&str> {
        self.timestamp.get(11..19).or_else(|| self.timestamp.get(11..))
    }

    /// Everything after the date, or the whole timestamp when there is no date.
    fn time_of_day(&self) -> &str {
        self.timestamp.get(11..).unwrap_or(&self.timestamp)
    }

    /// The event description cut down to a short summary.
    pub fn summary(&self) -> String {
        let text = &self.event_description;
        match text.char_indices().nth(SUMMARY_CHARS) {
            Some((end, _)) => format!("{}...", &text[..end]),
            None => text.clone(),
        }
    }

    /// The single-line form used in the full record and for playback.
    pub fn format_line(&self) -> String {
        let marker = if self.is_critical { "⚠ " } else { "▶ " };
        format!(
            "{}{:03} {} | {} | {}",
            marker,
            self.display_order,
            self.time_of_day(),
            self.operator_id,
            self.summary()
        )
    }

    /// The multi-line form used inside a panel. Critical entries carry a
    /// trailing `△`.
    pub fn format_panel(&self) -> String {
        let mut text = format!("{:02} ", self.display_order);
        if let Some(clock) = self.clock() {
            text.push_str(clock);
            text.push(' ');
        }
        text.push_str(&self.operator_id);
        text.push_str("\n   ");
        text.push_str(&self.event_description);
        if self.is_critical {
            text.push_str(" △");
        }
        text.push('\n');
        if !self.data_summary.is_empty() {
            text.push_str("   ");
            text.push_str(&self.data_summary);
        }
        text
    }

    /// Every field, for a detail view.
    pub fn full_info(&self) -> String {
        format!(
            "[{}]\nTime: {}\nOperator: {}\nType: {}\n\nEvent: {}\n\nData: {}\n{}",
            self.log_id,
            self.timestamp,
            self.operator_id,
            self.log_type,
            self.event_description,
            self.data_summary,
            if self.is_critical { "⚠ Critical record" } else { "" }
        )
    }
}

/// Log entries kept sorted by display order.
#[derive(Debug, Clone, Default)]
pub struct Logbook {
    entries: Vec<LogEntry>,
}

impl Logbook {
    pub fn new(mut entries: Vec<LogEntry>) -> Self {
        entries.sort_by_key(|entry| entry.display_order);
        Self { entries }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let entries = csv_reader.deserialize()
            .collect::<std::result::Result<Vec<LogEntry>, _>>()?;
        debug!("Read {} log entries", entries.len());
        Ok(Self::new(entries))
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, display_order: u32) -> Option<&LogEntry> {
        self.entries.iter().find(|entry| entry.display_order == display_order)
    }

    /// Shows or hides one entry in panels. Returns `false` if there is no
    /// entry with that display order.
    pub fn toggle_visibility(&mut self, display_order: u32, show: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.display_order == display_order) {
            Some(entry) => {
                entry.show_in_panel = show;
                true
            }
            None => {
                warn!("No log entry with display order {}", display_order);
                false
            }
        }
    }

    /// The panel text for the given display orders, skipping hidden and
    /// unknown entries.
    pub fn panel_text(&self, display_orders: &[u32]) -> String {
        let mut text = String::new();
        for entry in display_orders.iter().filter_map(|&order| self.entry(order)) {
            if entry.show_in_panel {
                text.push_str(&entry.format_panel());
                text.push_str("\n\n");
            }
        }
        text
    }

    /// The whole log under a header, one line per entry.
    pub fn render_full(&self) -> String {
        let rule = "═".repeat(39);
        let separator = format!("\n{}\n", "━".repeat(32));

        let mut text = format!("{}\n{}\n\n", FULL_LOG_HEADER, rule);
        for entry in &self.entries {
            text.push_str(&entry.format_line());
            text.push_str(&separator);
        }
        text
    }

    pub fn full_info(&self, display_order: u32) -> Option<String> {
        self.entry(display_order).map(LogEntry::full_info)
    }

    /// One line per entry, ready for a [`LineSequencer`](crate::LineSequencer).
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(LogEntry::format_line).collect()
    }
}
