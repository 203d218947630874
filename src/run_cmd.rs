//! CLI command handler for `run`.
//!
//! Replays a whole data entry session from a TOML script:
//!
//! ```toml
//! workbook = "derby.json"
//! racers = 2
//! lanes = 2
//!
//! [[racer]]
//! racer_number = 1
//! racer_name = "Alex"
//! car_name = "Blue Streak"
//! car_number = 42
//! car_weight = "5.0 oz"
//!
//! [[race]]
//! racer1_lane = 1
//! racer1_time = 5.12
//! racer2_lane = 2
//! racer2_time = 5.30
//! ```
//!
//! Values may be written as numbers or strings; they go through the same
//! validation as typed form input.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::core::form::{RaceTimeInput, RacerForm};
use crate::report::{AggregationMethod, Report};
use crate::session::{FixedWorkbook, Session};
use crate::{DerbyError, DerbyResult};

/// A form field as written in a script.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Field {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Default for Field {
    fn default() -> Self {
        Field::Text(String::new())
    }
}

impl Field {
    fn into_text(self) -> String {
        match self {
            Field::Int(v) => v.to_string(),
            Field::Float(v) => v.to_string(),
            Field::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionScript {
    #[serde(default)]
    workbook: Option<PathBuf>,
    racers: Field,
    lanes: Field,
    #[serde(default)]
    method: Option<AggregationMethod>,
    #[serde(default, rename = "racer")]
    racer_forms: Vec<ScriptRacer>,
    #[serde(default, rename = "race")]
    races: Vec<ScriptRace>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScriptRacer {
    racer_number: Field,
    racer_name: Field,
    rank: Field,
    car_name: Field,
    car_number: Field,
    car_weight: Field,
    mods: Field,
}

impl From<ScriptRacer> for RacerForm {
    fn from(r: ScriptRacer) -> Self {
        RacerForm {
            racer_number: r.racer_number.into_text(),
            racer_name: r.racer_name.into_text(),
            rank: r.rank.into_text(),
            car_name: r.car_name.into_text(),
            car_number: r.car_number.into_text(),
            car_weight: r.car_weight.into_text(),
            mods: r.mods.into_text(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScriptRace {
    racer1_lane: Field,
    racer1_time: Field,
    racer2_lane: Field,
    racer2_time: Field,
}

impl From<ScriptRace> for RaceTimeInput {
    fn from(r: ScriptRace) -> Self {
        RaceTimeInput::new(
            r.racer1_lane.into_text(),
            r.racer1_time.into_text(),
            r.racer2_lane.into_text(),
            r.racer2_time.into_text(),
        )
    }
}

/// Run the `run` command.
///
/// # Arguments
/// * `script` - Path to the TOML session script
/// * `workbook` - Overrides the script's `workbook`
/// * `default_workbook` - Used when neither the flag nor the script names one
/// * `method` - Overrides the script's `method`
/// * `default_method` - Used when neither the flag nor the script names one
/// * `json_out` - Also write the report as JSON
pub fn run(
    script: PathBuf,
    workbook: Option<PathBuf>,
    default_workbook: Option<PathBuf>,
    method: Option<AggregationMethod>,
    default_method: AggregationMethod,
    json_out: Option<PathBuf>,
) -> DerbyResult<Report> {
    if !script.exists() {
        return Err(DerbyError::NotFound(format!(
            "session script not found: {}",
            script.display()
        )));
    }
    let text = std::fs::read_to_string(&script)?;
    let parsed: SessionScript = toml::from_str(&text)?;

    let workbook = workbook
        .or_else(|| parsed.workbook.as_ref().map(|w| relative_to(&script, w)))
        .or(default_workbook);
    let method = method.or(parsed.method).unwrap_or(default_method);

    let mut session = Session::new(FixedWorkbook(workbook));
    let counts = session.confirm(&parsed.racers.into_text(), &parsed.lanes.into_text())?;
    eprintln!("Confirmed {} racer(s) on {} lane(s)", counts.racers, counts.lanes);

    for racer in parsed.racer_forms {
        let form = RacerForm::from(racer);
        session.submit_racer(&form)?;
        eprintln!("Racer {} details saved", form.racer_number.trim());
    }

    let rows: Vec<RaceTimeInput> = parsed.races.into_iter().map(RaceTimeInput::from).collect();
    let total = session.submit_race_times(&rows)?;
    eprintln!("Race times for {} races saved ({} rows total)", rows.len(), total);

    let report = session.analyze(method)?;
    info!(races = report.races, "session complete");

    if let Some(json) = json_out {
        crate::report_cmd::write_json(&report, &json)?;
    }
    println!("{}", report.render_text());
    Ok(report)
}

fn relative_to(script: &Path, workbook: &Path) -> PathBuf {
    match script.parent() {
        Some(dir) if workbook.is_relative() && !dir.as_os_str().is_empty() => dir.join(workbook),
        _ => workbook.to_path_buf(),
    }
}
