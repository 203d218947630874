//! Record types persisted in the race workbook.

use serde::{Deserialize, Serialize};

use crate::{DerbyError, DerbyResult};

/// Sheet holding one row per submitted racer profile.
pub const RACER_SHEET: &str = "Racer Details";

/// Sheet holding one row per timed race.
pub const RACE_TIMES_SHEET: &str = "Race Times";

/// Racer sheet columns in persisted order.
pub const RACER_COLUMNS: &[&str] = &[
    "Racer Number",
    "Racer Name",
    "Boy Scout Rank",
    "Car Name",
    "Car Number",
    "Car Weight",
    "Mods",
];

/// Race time sheet columns in persisted order.
pub const RACE_TIME_COLUMNS: &[&str] = &[
    "Race #",
    "Racer 1 - Lane",
    "Racer 1 - Time",
    "Racer 2 - Lane",
    "Racer 2 - Time",
];

/// Number of races recorded by every save of race times.
pub const RACES_PER_BATCH: usize = 10;

pub const MAX_CAR_NUMBER: u16 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RacerNumber {
    One,
    Two,
}

impl RacerNumber {
    pub fn as_u8(self) -> u8 {
        match self {
            RacerNumber::One => 1,
            RacerNumber::Two => 2,
        }
    }

    /// Name shown in reports when no profile exists for this racer.
    pub fn placeholder_name(self) -> String {
        format!("Racer {}", self.as_u8())
    }
}

impl TryFrom<u8> for RacerNumber {
    type Error = DerbyError;

    fn try_from(value: u8) -> DerbyResult<Self> {
        match value {
            1 => Ok(RacerNumber::One),
            2 => Ok(RacerNumber::Two),
            other => Err(DerbyError::Validation(format!(
                "racer number must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<RacerNumber> for u8 {
    fn from(value: RacerNumber) -> u8 {
        value.as_u8()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Lane {
    One,
    Two,
}

impl Lane {
    pub fn as_u8(self) -> u8 {
        match self {
            Lane::One => 1,
            Lane::Two => 2,
        }
    }
}

impl TryFrom<u8> for Lane {
    type Error = DerbyError;

    fn try_from(value: u8) -> DerbyResult<Self> {
        match value {
            1 => Ok(Lane::One),
            2 => Ok(Lane::Two),
            other => Err(DerbyError::Validation(format!(
                "lane must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<Lane> for u8 {
    fn from(value: Lane) -> u8 {
        value.as_u8()
    }
}

/// Racer and lane counts confirmed at the start of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounts {
    pub racers: u8,
    pub lanes: u8,
}

/// One racer and the car they field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacerProfile {
    pub racer_number: RacerNumber,
    pub racer_name: String,
    /// Boy Scout rank, free text, may be empty.
    pub rank: String,
    pub car_name: String,
    pub car_number: u16,
    pub car_weight: String,
    /// Modification notes, possibly spanning several lines.
    pub mods: String,
}

impl RacerProfile {
    /// Check the free-text fields that must not be blank.
    pub fn validate(&self) -> DerbyResult<()> {
        let required = [
            ("Racer Name", &self.racer_name),
            ("Car Name", &self.car_name),
            ("Car Weight", &self.car_weight),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DerbyError::Validation(format!("{field} must be filled in")));
            }
        }
        if self.car_number > MAX_CAR_NUMBER {
            return Err(DerbyError::Validation(format!(
                "Car Number must be at most {MAX_CAR_NUMBER}, got {}",
                self.car_number
            )));
        }
        Ok(())
    }
}

/// Lanes and elapsed times of both racers for one race.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceTimeEntry {
    /// 1-based race index within its batch.
    pub race: u8,
    pub racer1_lane: Lane,
    pub racer1_time: f64,
    pub racer2_lane: Lane,
    pub racer2_time: f64,
}

/// Exactly [`RACES_PER_BATCH`] race entries, saved together.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceTimeBatch {
    entries: Vec<RaceTimeEntry>,
}

impl RaceTimeBatch {
    pub fn new(entries: Vec<RaceTimeEntry>) -> DerbyResult<Self> {
        if entries.len() != RACES_PER_BATCH {
            return Err(DerbyError::Validation(format!(
                "expected {RACES_PER_BATCH} race entries, got {}",
                entries.len()
            )));
        }
        for entry in &entries {
            for time in [entry.racer1_time, entry.racer2_time] {
                if !time.is_finite() || time < 0.0 {
                    return Err(DerbyError::Validation(format!(
                        "race {} has an invalid time {time}",
                        entry.race
                    )));
                }
            }
        }
        Ok(RaceTimeBatch { entries })
    }

    pub fn entries(&self) -> &[RaceTimeEntry] {
        &self.entries
    }
}
