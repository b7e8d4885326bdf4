//! Closed identifiers for pluggable strategies.
//!
//! Configuration files name parsers, summarizers, and plotters by string.
//! Those strings are resolved to these enums once, at load time, so an
//! unknown name fails before any benchmark runs.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A strategy name that matched no known identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {role} `{name}` (expected one of: {})", .expected.join(", "))]
pub struct UnknownStrategy {
    /// Strategy role ("parser", "summarizer", or "plotter").
    pub role: &'static str,
    /// The name that failed to resolve.
    pub name: String,
    /// Accepted names.
    pub expected: Vec<&'static str>,
}

macro_rules! strategy_kind {
    (
        $(#[$meta:meta])*
        $name:ident, $role:literal {
            $($(#[$vmeta:meta])* $variant:ident => $id:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All identifiers, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the canonical configuration name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownStrategy;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($id $(| $alias)* => Ok($name::$variant),)+
                    other => Err(UnknownStrategy {
                        role: $role,
                        name: other.to_string(),
                        expected: vec![$($id),+],
                    }),
                }
            }
        }
    };
}

strategy_kind! {
    /// Sample parser identifiers, one per toolchain output convention.
    ParserKind, "parser" {
        /// Lingua Franca C++ runtime: `Iteration: <n>\t Duration: <value> <unit>`.
        LfCpp => "lf_cpp" | "parserLfCpp",
        /// Lingua Franca C runtime: `Iteration <n> - <value> <unit>`.
        LfC => "lf_c" | "parserLfC",
        /// Savina/Akka benchmark harness report.
        Savina => "savina" | "parserSavina",
    }
}

strategy_kind! {
    /// Summarizer identifiers.
    SummarizerKind, "summarizer" {
        /// Median after warm-up discard.
        MedianWarmup => "median_warmup" | "summarizerMedianWarmup",
        /// Arithmetic mean after warm-up discard.
        MeanWarmup => "mean_warmup",
        /// 10% trimmed mean after warm-up discard.
        TrimmedMeanWarmup => "trimmed_mean_warmup",
        /// Minimum after warm-up discard.
        MinWarmup => "min_warmup",
    }
}

strategy_kind! {
    /// Plot styles understood by the report builder.
    PlotterKind, "plotter" {
        /// Clustered boxes, one cluster per sequence.
        Box => "box" | "plotterBox",
        /// One line per variant across sequences.
        Line => "line" | "plotterLine",
    }
}

impl Default for SummarizerKind {
    fn default() -> Self {
        SummarizerKind::MedianWarmup
    }
}

impl Default for PlotterKind {
    fn default() -> Self {
        PlotterKind::Box
    }
}
