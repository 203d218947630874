//! One data entry session: confirm counts, save racers, save race times, analyze.
//!
//! The session owns the state that spans those steps: the workbook chosen on
//! the first save, the confirmed racer and lane counts, and how many racer
//! profiles have been saved so far.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::form::{RaceTimeInput, RacerForm, confirm_counts, parse_race_times};
use crate::core::schema::{RACE_TIMES_SHEET, RACER_SHEET, SessionCounts};
use crate::report::{AggregationMethod, Report, aggregate};
use crate::storage::RecordStore;
use crate::{DerbyError, DerbyResult};

/// Asks where the workbook should live. Called at most once per session,
/// on the first save.
pub trait WorkbookPrompt {
    /// `None` means the user picked nothing.
    fn choose_workbook(&mut self) -> Option<PathBuf>;
}

/// Prompt that always answers with a path decided up front.
pub struct FixedWorkbook(pub Option<PathBuf>);

impl WorkbookPrompt for FixedWorkbook {
    fn choose_workbook(&mut self) -> Option<PathBuf> {
        self.0.clone()
    }
}

pub struct Session<P: WorkbookPrompt> {
    prompt: P,
    store: Option<RecordStore>,
    counts: Option<SessionCounts>,
    racers_saved: u8,
}

impl<P: WorkbookPrompt> Session<P> {
    pub fn new(prompt: P) -> Self {
        Session {
            prompt,
            store: None,
            counts: None,
            racers_saved: 0,
        }
    }

    pub fn counts(&self) -> Option<SessionCounts> {
        self.counts
    }

    pub fn racers_saved(&self) -> u8 {
        self.racers_saved
    }

    /// Workbook chosen for this session, if a save has happened yet.
    pub fn workbook(&self) -> Option<&Path> {
        self.store.as_ref().map(|s| s.path())
    }

    /// Validate and record the racer and lane counts.
    pub fn confirm(&mut self, racers_text: &str, lanes_text: &str) -> DerbyResult<SessionCounts> {
        let counts = confirm_counts(racers_text, lanes_text)?;
        if self.racers_saved > 0 && Some(counts) != self.counts {
            return Err(DerbyError::Validation(
                "racer and lane counts cannot change after racers were saved".to_string(),
            ));
        }
        info!(racers = counts.racers, lanes = counts.lanes, "confirmed session counts");
        self.counts = Some(counts);
        Ok(counts)
    }

    /// Validate a racer form and append it to the workbook.
    pub fn submit_racer(&mut self, form: &RacerForm) -> DerbyResult<usize> {
        let counts = self.require_counts()?;
        if self.racers_saved >= counts.racers {
            return Err(DerbyError::Validation(format!(
                "maximum number of racers ({}) already saved",
                counts.racers
            )));
        }

        let profile = form.parse()?;
        let rows = self.store()?.append_racer(&profile)?;
        self.racers_saved += 1;
        if self.racers_saved < counts.racers {
            info!("racer details saved, enter the next racer");
        }
        Ok(rows)
    }

    /// Validate the race entry grid and append it to the workbook.
    pub fn submit_race_times(&mut self, rows: &[RaceTimeInput]) -> DerbyResult<usize> {
        let counts = self.require_counts()?;
        if self.racers_saved < counts.racers {
            return Err(DerbyError::Validation(format!(
                "save all {} racer(s) before entering race times ({} saved)",
                counts.racers, self.racers_saved
            )));
        }

        let batch = parse_race_times(rows, counts.lanes)?;
        self.store()?.append_race_times(&batch)
    }

    /// Aggregate everything stored in the session workbook.
    pub fn analyze(&self, method: AggregationMethod) -> DerbyResult<Report> {
        let store = self.store.as_ref().ok_or_else(|| {
            DerbyError::NotFound("race results file not found: nothing saved yet".to_string())
        })?;
        analyze_store(store, method)
    }

    fn require_counts(&self) -> DerbyResult<SessionCounts> {
        self.counts.ok_or_else(|| {
            DerbyError::Validation("confirm the number of racers and lanes first".to_string())
        })
    }

    fn store(&mut self) -> DerbyResult<&RecordStore> {
        let store = match self.store.take() {
            Some(store) => store,
            None => {
                let path = self.prompt.choose_workbook().ok_or_else(|| {
                    warn!("no workbook chosen");
                    DerbyError::Validation(
                        "No file selected. Please select a file to save race data.".to_string(),
                    )
                })?;
                info!(workbook = %path.display(), "using workbook");
                RecordStore::new(path)
            }
        };
        Ok(self.store.insert(store))
    }
}

/// Load both sheets from a store and aggregate them.
pub fn analyze_store(store: &RecordStore, method: AggregationMethod) -> DerbyResult<Report> {
    let racers = store.load(RACER_SHEET)?;
    let races = store.load(RACE_TIMES_SHEET)?;
    aggregate(&racers, &races, method)
}
