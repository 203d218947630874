//! Race results report.
//!
//! The report has a fixed layout: fastest car per lane, average time per
//! racer per lane, then each racer's overall average.

use serde::{Deserialize, Serialize};

use crate::core::schema::RacerNumber;
use crate::format_seconds;

/// How the aggregator treats missing cells and lane ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMethod {
    /// Missing values count as zero, and each lane's fastest time is taken
    /// from one racer's column (racer 1 for lane 1, racer 2 for lane 2).
    #[default]
    Classic,
    /// Missing values are left out, and each lane's fastest time is taken
    /// over both racers.
    LaneScan,
}

/// Fastest time recorded on one lane and who holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastestLane {
    pub lane: u8,
    pub racer: RacerNumber,
    pub racer_name: String,
    /// `None` when no race was run on this lane.
    pub time: Option<f64>,
}

/// Averages for one racer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacerAverages {
    pub racer: RacerNumber,
    pub name: String,
    pub lane1: Option<f64>,
    pub lane2: Option<f64>,
    pub overall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub method: AggregationMethod,
    /// Number of race rows the report was computed from.
    pub races: usize,
    pub fastest: [FastestLane; 2],
    pub averages: [RacerAverages; 2],
}

impl Report {
    /// Render the eight result lines, grouped by blank lines.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for f in &self.fastest {
            out.push_str(&format!(
                "Fastest Car on Lane {}: {}, {}\n",
                f.lane,
                f.racer_name,
                format_seconds(f.time)
            ));
        }
        out.push('\n');
        for a in &self.averages {
            out.push_str(&format!(
                "Average Race Time for {} on Lane 1: {}\n",
                a.name,
                format_seconds(a.lane1)
            ));
            out.push_str(&format!(
                "Average Race Time for {} on Lane 2: {}\n",
                a.name,
                format_seconds(a.lane2)
            ));
        }
        out.push('\n');
        let overall: Vec<String> = self
            .averages
            .iter()
            .map(|a| {
                format!(
                    "Overall Average Race Time for {}: {}",
                    a.name,
                    format_seconds(a.overall)
                )
            })
            .collect();
        out.push_str(&overall.join("\n"));
        out
    }
}
