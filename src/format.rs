use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::cluster::rollup::Rollup;
use crate::cluster::worker::WorkerRecord;

/// Urgency of a metric value, least to most urgent. The UI decides the colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Neutral,
    Low,
    Medium,
    High,
    Overloaded,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Neutral => "neutral",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Overloaded => "overloaded",
        }
    }

    pub fn memory(utilization: f64) -> Self {
        if utilization > 1.0 {
            Severity::Overloaded
        } else if utilization >= 0.75 {
            Severity::High
        } else if utilization >= 0.5 {
            Severity::Medium
        } else if utilization > 0.0 {
            Severity::Low
        } else {
            Severity::Neutral
        }
    }

    pub fn cpu(percent: f64) -> Self {
        if percent > 100.0 {
            Severity::Overloaded
        } else if percent >= 75.0 {
            Severity::High
        } else if percent >= 40.0 {
            Severity::Medium
        } else {
            Severity::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCell {
    pub text: String,
    pub severity: Severity,
}

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Decimal units, two places. Exactly one unit renders in that unit (`1.00 GB`),
/// and a value that rounds up to 1000 moves to the next unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "GB"), (1e6, "MB"), (1e3, "KB")];

    let value = bytes as f64;
    for (i, &(size, unit)) in UNITS.iter().enumerate() {
        if value / size < 1.0 {
            continue;
        }
        let text = format!("{:.2}", value / size);
        if text == "1000.00"
            && let Some(&(larger, larger_unit)) = i.checked_sub(1).and_then(|j| UNITS.get(j))
        {
            return format!("{:.2} {larger_unit}", value / larger);
        }
        return format!("{text} {unit}");
    }
    format!("{bytes} B")
}

pub fn format_memory_cell(worker: &WorkerRecord) -> FormattedCell {
    let utilization = worker.memory_utilization();
    FormattedCell {
        text: format!(
            "{:.2}% ({}/{})",
            utilization * 100.0,
            format_bytes(worker.memory_used),
            format_bytes(worker.memory_limit)
        ),
        severity: Severity::memory(utilization),
    }
}

pub fn format_cpu_cell(worker: &WorkerRecord) -> FormattedCell {
    FormattedCell {
        text: format!("{:.1}%", worker.cpu_percent),
        severity: Severity::cpu(worker.cpu_percent),
    }
}

/// Column values for the rollup row, in header order.
pub fn format_rollup(rollup: &Rollup) -> [String; 8] {
    [
        rollup.worker_count.to_string(),
        format!("{:.2}", rollup.avg_cpu),
        format!("{:.2}%", rollup.avg_memory_utilization * 100.0),
        rollup.total_fds.to_string(),
        rollup.total_executing.to_string(),
        rollup.total_in_memory.to_string(),
        rollup.total_ready.to_string(),
        rollup.total_in_flight.to_string(),
    ]
}
