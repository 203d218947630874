//! Validation of text-valued form fields into typed records.
//!
//! Every function here runs before the workbook is touched, so a rejected
//! submission never leaves a partial write behind.

use serde::{Deserialize, Serialize};

use super::schema::{
    Lane, MAX_CAR_NUMBER, RACE_TIME_COLUMNS, RACES_PER_BATCH, RaceTimeBatch, RaceTimeEntry,
    RacerNumber, RacerProfile, SessionCounts,
};
use crate::{DerbyError, DerbyResult};

const MAX_RACERS: i64 = 2;
const MAX_LANES: i64 = 2;

/// Validate the racer and lane counts entered at the start of a session.
pub fn confirm_counts(racers_text: &str, lanes_text: &str) -> DerbyResult<SessionCounts> {
    let racers = parse_int("Number of Racers", racers_text)?;
    let lanes = parse_int("Number of Lanes", lanes_text)?;

    if !(1..=MAX_RACERS).contains(&racers) {
        return Err(DerbyError::Validation(
            "Number of racers must be 1 or 2.".to_string(),
        ));
    }
    if !(1..=MAX_LANES).contains(&lanes) {
        return Err(DerbyError::Validation(
            "Number of lanes must be 1 or 2.".to_string(),
        ));
    }

    Ok(SessionCounts {
        racers: racers as u8,
        lanes: lanes as u8,
    })
}

/// Racer details exactly as typed into the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RacerForm {
    pub racer_number: String,
    pub racer_name: String,
    pub rank: String,
    pub car_name: String,
    pub car_number: String,
    pub car_weight: String,
    pub mods: String,
}

impl RacerForm {
    /// Trim every field, check required ones, and parse the numeric ones.
    pub fn parse(&self) -> DerbyResult<RacerProfile> {
        let required = [
            ("Racer Number", &self.racer_number),
            ("Racer Name", &self.racer_name),
            ("Car Name", &self.car_name),
            ("Car Number", &self.car_number),
            ("Car Weight", &self.car_weight),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DerbyError::Validation(format!(
                    "{field} must be filled in before saving"
                )));
            }
        }

        let number = parse_int("Racer Number", &self.racer_number)?;
        let racer_number = u8::try_from(number)
            .map_err(|_| DerbyError::Validation(format!("racer number must be 1 or 2, got {number}")))
            .and_then(RacerNumber::try_from)?;

        let car_number = parse_int("Car Number", &self.car_number)?;
        if !(0..=i64::from(MAX_CAR_NUMBER)).contains(&car_number) {
            return Err(DerbyError::Validation(format!(
                "Car Number must be between 0 and {MAX_CAR_NUMBER}, got {car_number}"
            )));
        }

        Ok(RacerProfile {
            racer_number,
            racer_name: self.racer_name.trim().to_string(),
            rank: self.rank.trim().to_string(),
            car_name: self.car_name.trim().to_string(),
            car_number: car_number as u16,
            car_weight: self.car_weight.trim().to_string(),
            mods: self.mods.trim().to_string(),
        })
    }
}

/// One row of the race entry grid, as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceTimeInput {
    pub racer1_lane: String,
    pub racer1_time: String,
    pub racer2_lane: String,
    pub racer2_time: String,
}

impl RaceTimeInput {
    pub fn new(
        racer1_lane: impl Into<String>,
        racer1_time: impl Into<String>,
        racer2_lane: impl Into<String>,
        racer2_time: impl Into<String>,
    ) -> Self {
        RaceTimeInput {
            racer1_lane: racer1_lane.into(),
            racer1_time: racer1_time.into(),
            racer2_lane: racer2_lane.into(),
            racer2_time: racer2_time.into(),
        }
    }
}

/// Parse the full race entry grid into a batch.
///
/// Lanes above `lanes` (the confirmed lane count) are rejected.
pub fn parse_race_times(rows: &[RaceTimeInput], lanes: u8) -> DerbyResult<RaceTimeBatch> {
    if rows.len() != RACES_PER_BATCH {
        return Err(DerbyError::Validation(format!(
            "race times must be entered for exactly {RACES_PER_BATCH} races, got {}",
            rows.len()
        )));
    }

    let mut entries = Vec::with_capacity(RACES_PER_BATCH);
    for (i, row) in rows.iter().enumerate() {
        let race = (i + 1) as u8;
        let field = |column: usize| format!("Race {race}: {}", RACE_TIME_COLUMNS[column]);

        entries.push(RaceTimeEntry {
            race,
            racer1_lane: parse_lane(&field(1), &row.racer1_lane, lanes)?,
            racer1_time: parse_time(&field(2), &row.racer1_time)?,
            racer2_lane: parse_lane(&field(3), &row.racer2_lane, lanes)?,
            racer2_time: parse_time(&field(4), &row.racer2_time)?,
        });
    }

    RaceTimeBatch::new(entries)
}

fn parse_int(field: &str, text: &str) -> DerbyResult<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| DerbyError::parse(field, text.trim()))
}

fn parse_lane(field: &str, text: &str, lanes: u8) -> DerbyResult<Lane> {
    let value = parse_int(field, text)?;
    if value < 1 || value > i64::from(lanes) {
        return Err(DerbyError::Validation(format!(
            "{field} must be between 1 and {lanes}, got {value}"
        )));
    }
    Lane::try_from(value as u8)
}

fn parse_time(field: &str, text: &str) -> DerbyResult<f64> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|_| DerbyError::parse(field, text.trim()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(DerbyError::Validation(format!(
            "{field} must be a non-negative number of seconds, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> RacerForm {
        RacerForm {
            racer_number: "1".to_string(),
            racer_name: " Alex ".to_string(),
            rank: "Webelos".to_string(),
            car_name: "Blue Streak".to_string(),
            car_number: "42".to_string(),
            car_weight: "5.0 oz".to_string(),
            mods: "polished axles\nrail rider".to_string(),
        }
    }

    fn grid() -> Vec<RaceTimeInput> {
        (0..RACES_PER_BATCH)
            .map(|i| RaceTimeInput::new("1", format!("5.{i}"), "2", "5.5"))
            .collect()
    }

    #[test]
    fn test_confirm_all_valid_pairs() {
        for racers in ["1", "2"] {
            for lanes in ["1", "2"] {
                let counts = confirm_counts(racers, lanes).unwrap();
                assert_eq!(counts.racers.to_string(), racers);
                assert_eq!(counts.lanes.to_string(), lanes);
            }
        }
    }

    #[test]
    fn test_confirm_out_of_range() {
        for (racers, lanes) in [("0", "1"), ("3", "1"), ("1", "0"), ("2", "3"), ("-1", "2")] {
            assert!(matches!(
                confirm_counts(racers, lanes),
                Err(DerbyError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_confirm_non_integer() {
        assert!(matches!(
            confirm_counts("two", "1"),
            Err(DerbyError::Parse { .. })
        ));
        assert!(matches!(
            confirm_counts("1", "1.5"),
            Err(DerbyError::Parse { .. })
        ));
        assert!(matches!(confirm_counts("", "1"), Err(DerbyError::Parse { .. })));
    }

    #[test]
    fn test_racer_form_trims_fields() {
        let profile = full_form().parse().unwrap();
        assert_eq!(profile.racer_number, RacerNumber::One);
        assert_eq!(profile.racer_name, "Alex");
        assert_eq!(profile.car_number, 42);
        assert_eq!(profile.mods, "polished axles\nrail rider");
    }

    #[test]
    fn test_racer_form_missing_required_field() {
        let mut form = full_form();
        form.car_weight = "   ".to_string();
        let err = form.parse().unwrap_err();
        assert!(matches!(err, DerbyError::Validation(_)));
        assert!(err.to_string().contains("Car Weight"));
    }

    #[test]
    fn test_racer_form_optional_fields_may_be_empty() {
        let mut form = full_form();
        form.rank.clear();
        form.mods.clear();
        assert!(form.parse().is_ok());
    }

    #[test]
    fn test_racer_form_bad_numbers() {
        let mut form = full_form();
        form.racer_number = "3".to_string();
        assert!(matches!(form.parse(), Err(DerbyError::Validation(_))));

        let mut form = full_form();
        form.racer_number = "one".to_string();
        assert!(matches!(form.parse(), Err(DerbyError::Parse { .. })));

        let mut form = full_form();
        form.car_number = "1000".to_string();
        assert!(matches!(form.parse(), Err(DerbyError::Validation(_))));
    }

    #[test]
    fn test_parse_race_times_assigns_indices() {
        let batch = parse_race_times(&grid(), 2).unwrap();
        let races: Vec<u8> = batch.entries().iter().map(|e| e.race).collect();
        assert_eq!(races, (1..=10).collect::<Vec<u8>>());
        assert_eq!(batch.entries()[3].racer1_time, 5.3);
        assert_eq!(batch.entries()[3].racer2_lane, Lane::Two);
    }

    #[test]
    fn test_parse_race_times_names_bad_field() {
        let mut rows = grid();
        rows[2].racer2_time = "fast".to_string();
        match parse_race_times(&rows, 2) {
            Err(DerbyError::Parse { field, value }) => {
                assert_eq!(field, "Race 3: Racer 2 - Time");
                assert_eq!(value, "fast");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_race_times_rejects_lane_beyond_confirmed() {
        let rows = grid();
        assert!(matches!(
            parse_race_times(&rows, 1),
            Err(DerbyError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_race_times_wrong_row_count() {
        let mut rows = grid();
        rows.pop();
        assert!(matches!(
            parse_race_times(&rows, 2),
            Err(DerbyError::Validation(_))
        ));
    }
}
