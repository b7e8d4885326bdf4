//! Plot descriptions.

use benchforge_core::{PlotterKind, Spread};
use serde::Serialize;

/// A chart as handed to the plotting tool.
///
/// `entries` is ordered sequence-major: for every label on the x axis, one
/// entry per series in arranged order. A cell without a value stays in the
/// list as [`PlotValue::Absent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotDescription {
    /// Artifact stem (experiment id, or `global` for the overview).
    pub name: String,
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub gnuplot_header: String,
    pub plotter: PlotterKind,
    /// Labels along the x axis in display order.
    pub x_labels: Vec<String>,
    /// Series in arranged order.
    pub series: Vec<PlotSeries>,
    pub entries: Vec<PlotEntry>,
}

impl PlotDescription {
    /// Returns the entries of one x-axis label, in series order.
    pub fn entries_at<'a>(&'a self, x_label: &'a str) -> impl Iterator<Item = &'a PlotEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.x_label == x_label)
    }

    /// Looks up the entry for (x label, variant).
    pub fn entry(&self, x_label: &str, variant: &str) -> Option<&PlotEntry> {
        self.entries
            .iter()
            .find(|entry| entry.x_label == x_label && entry.variant == variant)
    }

    /// Number of entries carrying a value.
    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_present()).count()
    }

    /// Number of entries flagged absent.
    pub fn absent_count(&self) -> usize {
        self.entries.len() - self.present_count()
    }

    /// Serializes the description as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Display attributes of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotSeries {
    pub variant: String,
    pub display_name: String,
    pub color: String,
}

/// One (x label, variant) point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotEntry {
    pub x_label: String,
    pub variant: String,
    pub display_name: String,
    pub color: String,
    pub value: PlotValue,
}

/// Value of a point, or the reason it has none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlotValue {
    Present {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        spread: Option<Spread>,
    },
    Absent {
        reason: String,
    },
}

impl PlotValue {
    /// Returns the value, if present.
    pub fn value(&self) -> Option<f64> {
        match self {
            PlotValue::Present { value, .. } => Some(*value),
            PlotValue::Absent { .. } => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, PlotValue::Present { .. })
    }
}
