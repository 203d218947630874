//! Derive race statistics from the racer and race time sheets.

use std::collections::HashMap;

use tracing::debug;

use super::results::{AggregationMethod, FastestLane, RacerAverages, Report};
use crate::core::schema::{RACE_TIME_COLUMNS, RACER_COLUMNS, RacerNumber};
use crate::storage::workbook::{Cell, Sheet};
use crate::{DerbyError, DerbyResult};

/// Race time columns after numeric coercion. `None` marks a missing or
/// unparseable cell.
#[derive(Debug)]
struct RaceColumns {
    lane1: Vec<Option<i64>>,
    time1: Vec<Option<f64>>,
    lane2: Vec<Option<i64>>,
    time2: Vec<Option<f64>>,
}

impl RaceColumns {
    fn from_sheet(sheet: &Sheet) -> DerbyResult<Self> {
        let lane1 = sheet.column(RACE_TIME_COLUMNS[1])?;
        let time1 = sheet.column(RACE_TIME_COLUMNS[2])?;
        let lane2 = sheet.column(RACE_TIME_COLUMNS[3])?;
        let time2 = sheet.column(RACE_TIME_COLUMNS[4])?;

        Ok(RaceColumns {
            lane1: coerce_lanes(RACE_TIME_COLUMNS[1], &lane1)?,
            time1: time1.into_iter().map(coerce_time).collect(),
            lane2: coerce_lanes(RACE_TIME_COLUMNS[3], &lane2)?,
            time2: time2.into_iter().map(coerce_time).collect(),
        })
    }

    fn len(&self) -> usize {
        self.time1.len()
    }

    fn racer(&self, racer: RacerNumber) -> (&[Option<i64>], &[Option<f64>]) {
        match racer {
            RacerNumber::One => (&self.lane1, &self.time1),
            RacerNumber::Two => (&self.lane2, &self.time2),
        }
    }
}

/// Compute the race results report.
///
/// # Errors
/// Returns `Schema` when a sheet lacks an expected column and
/// `Aggregation` when a lane cell holds a fractional number.
pub fn aggregate(
    racer_sheet: &Sheet,
    race_sheet: &Sheet,
    method: AggregationMethod,
) -> DerbyResult<Report> {
    let names = racer_names(racer_sheet)?;
    let name_of = |racer: RacerNumber| {
        names
            .get(&racer.as_u8().to_string())
            .cloned()
            .unwrap_or_else(|| racer.placeholder_name())
    };

    let columns = RaceColumns::from_sheet(race_sheet)?;
    debug!(rows = columns.len(), ?method, "aggregating race times");

    let (fastest, averages) = match method {
        AggregationMethod::Classic => classic(&columns),
        AggregationMethod::LaneScan => lane_scan(&columns),
    };

    Ok(Report {
        method,
        races: columns.len(),
        fastest: fastest.map(|(lane, racer, time)| FastestLane {
            lane,
            racer,
            racer_name: name_of(racer),
            time,
        }),
        averages: averages.map(|(racer, [lane1, lane2, overall])| RacerAverages {
            racer,
            name: name_of(racer),
            lane1,
            lane2,
            overall,
        }),
    })
}

type Fastest = (u8, RacerNumber, Option<f64>);
type Averages = (RacerNumber, [Option<f64>; 3]);

/// Missing cells become zero. Lane 1's fastest comes from racer 1's times,
/// lane 2's from racer 2's, and is credited to that racer whenever the time
/// appears in their column.
fn classic(columns: &RaceColumns) -> ([Fastest; 2], [Averages; 2]) {
    let fill_lanes = |v: &[Option<i64>]| -> Vec<i64> { v.iter().map(|l| l.unwrap_or(0)).collect() };
    let fill_times = |v: &[Option<f64>]| -> Vec<f64> { v.iter().map(|t| t.unwrap_or(0.0)).collect() };

    let lane1 = fill_lanes(&columns.lane1);
    let time1 = fill_times(&columns.time1);
    let lane2 = fill_lanes(&columns.lane2);
    let time2 = fill_times(&columns.time2);

    let on_lane = |lanes: &[i64], times: &[f64], lane: i64| -> Vec<f64> {
        lanes
            .iter()
            .zip(times)
            .filter(|(l, _)| **l == lane)
            .map(|(_, t)| *t)
            .collect()
    };

    let fastest_lane1 = min(on_lane(&lane1, &time1, 1));
    let fastest_lane2 = min(on_lane(&lane2, &time2, 2));

    let holder1 = match fastest_lane1 {
        Some(f) if time1.contains(&f) => RacerNumber::One,
        _ => RacerNumber::Two,
    };
    let holder2 = match fastest_lane2 {
        Some(f) if time2.contains(&f) => RacerNumber::Two,
        _ => RacerNumber::One,
    };

    let fastest = [(1, holder1, fastest_lane1), (2, holder2, fastest_lane2)];
    let averages = [
        (
            RacerNumber::One,
            [
                mean(on_lane(&lane1, &time1, 1)),
                mean(on_lane(&lane1, &time1, 2)),
                mean(time1.iter().copied()),
            ],
        ),
        (
            RacerNumber::Two,
            [
                mean(on_lane(&lane2, &time2, 1)),
                mean(on_lane(&lane2, &time2, 2)),
                mean(time2.iter().copied()),
            ],
        ),
    ];
    (fastest, averages)
}

/// Missing cells are skipped. Each lane's fastest is the minimum over both
/// racers' runs on that lane, credited to whoever ran it (racer 1 on ties).
fn lane_scan(columns: &RaceColumns) -> ([Fastest; 2], [Averages; 2]) {
    let runs = |racer: RacerNumber, lane: i64| -> Vec<f64> {
        let (lanes, times) = columns.racer(racer);
        lanes
            .iter()
            .zip(times)
            .filter_map(|(l, t)| match (l, t) {
                (Some(l), Some(t)) if *l == lane => Some(*t),
                _ => None,
            })
            .collect()
    };

    let fastest_on = |lane: u8| -> Fastest {
        let default_holder = if lane == 1 {
            RacerNumber::One
        } else {
            RacerNumber::Two
        };
        let mut best: Option<(RacerNumber, f64)> = None;
        for racer in [RacerNumber::One, RacerNumber::Two] {
            if let Some(t) = min(runs(racer, i64::from(lane))) {
                if best.is_none_or(|(_, b)| t < b) {
                    best = Some((racer, t));
                }
            }
        }
        match best {
            Some((racer, t)) => (lane, racer, Some(t)),
            None => (lane, default_holder, None),
        }
    };

    let averages_for = |racer: RacerNumber| -> Averages {
        let (_, times) = columns.racer(racer);
        (
            racer,
            [
                mean(runs(racer, 1)),
                mean(runs(racer, 2)),
                mean(times.iter().flatten().copied()),
            ],
        )
    };

    (
        [fastest_on(1), fastest_on(2)],
        [averages_for(RacerNumber::One), averages_for(RacerNumber::Two)],
    )
}

/// Map racer number text to racer name. Later rows override earlier ones;
/// rows without a name are skipped.
fn racer_names(sheet: &Sheet) -> DerbyResult<HashMap<String, String>> {
    let numbers = sheet.column(RACER_COLUMNS[0])?;
    let names = sheet.column(RACER_COLUMNS[1])?;

    let mut map = HashMap::new();
    for (number, name) in numbers.into_iter().zip(names) {
        if name.is_empty() {
            continue;
        }
        map.insert(
            number.as_text().trim().to_string(),
            name.as_text().trim().to_string(),
        );
    }
    Ok(map)
}

fn coerce_time(cell: &Cell) -> Option<f64> {
    cell.to_number().filter(|v| !v.is_nan())
}

fn coerce_lanes(column: &str, cells: &[&Cell]) -> DerbyResult<Vec<Option<i64>>> {
    cells
        .iter()
        .map(|cell| match cell.to_number() {
            None => Ok(None),
            Some(v) if v.is_nan() => Ok(None),
            Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
            Some(_) => Err(DerbyError::Aggregation {
                column: column.to_string(),
                value: cell.as_text(),
                reason: "lane is not a whole number".to_string(),
            }),
        })
        .collect()
}

fn min(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m <= v => Some(m),
        _ => Some(v),
    })
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
