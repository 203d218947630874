//! Full data entry sessions, through the library session and the CLI handlers.

use std::path::PathBuf;

use derby_tracker::DerbyError;
use derby_tracker::core::form::{RaceTimeInput, RacerForm};
use derby_tracker::core::schema::{RACE_TIMES_SHEET, RACER_SHEET};
use derby_tracker::report::AggregationMethod;
use derby_tracker::session::{FixedWorkbook, Session};
use derby_tracker::storage::RecordStore;
use derby_tracker::{add_racer_cmd, add_times_cmd, confirm_cmd, export_cmd, run_cmd};

fn racer(number: &str, name: &str) -> RacerForm {
    RacerForm {
        racer_number: number.to_string(),
        racer_name: name.to_string(),
        rank: "Arrow of Light".to_string(),
        car_name: "Blue Streak".to_string(),
        car_number: "42".to_string(),
        car_weight: "5.0".to_string(),
        mods: "canted wheels front\npolished axles".to_string(),
    }
}

fn grid() -> Vec<RaceTimeInput> {
    (0..10)
        .map(|i| {
            if i % 2 == 0 {
                RaceTimeInput::new("1", "5.10", "2", "5.20")
            } else {
                RaceTimeInput::new("1", "5.30", "2", "5.40")
            }
        })
        .collect()
}

const GRID_CSV: &str = "\
Race #,Racer 1 - Lane,Racer 1 - Time,Racer 2 - Lane,Racer 2 - Time
1,1,5.10,2,5.20
2,1,5.30,2,5.40
3,1,5.10,2,5.20
4,1,5.30,2,5.40
5,1,5.10,2,5.20
6,1,5.30,2,5.40
7,1,5.10,2,5.20
8,1,5.30,2,5.40
9,1,5.10,2,5.20
10,1,5.30,2,5.40
";

#[test]
fn test_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("derby.json");
    let mut session = Session::new(FixedWorkbook(Some(path.clone())));

    session.confirm("2", "2").unwrap();
    assert_eq!(session.submit_racer(&racer("1", "Alex")).unwrap(), 1);
    assert_eq!(session.submit_racer(&racer("2", "Sam")).unwrap(), 2);
    assert_eq!(session.submit_race_times(&grid()).unwrap(), 10);

    let report = session.analyze(AggregationMethod::Classic).unwrap();
    let text = report.render_text();
    assert!(text.contains("Fastest Car on Lane 1: Alex, 5.10 seconds"));
    assert!(text.contains("Fastest Car on Lane 2: Sam, 5.20 seconds"));
    assert!(text.contains("Average Race Time for Alex on Lane 1: 5.20 seconds"));
    assert!(text.contains("Overall Average Race Time for Sam: 5.30 seconds"));

    // Saving the grid again appends another ten rows.
    assert_eq!(session.submit_race_times(&grid()).unwrap(), 20);
    let store = RecordStore::new(&path);
    assert_eq!(store.row_count(RACE_TIMES_SHEET).unwrap(), 20);
}

#[test]
fn test_single_lane_session_rejects_lane_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("derby.json");
    let mut session = Session::new(FixedWorkbook(Some(path.clone())));

    session.confirm("1", "1").unwrap();
    session.submit_racer(&racer("1", "Alex")).unwrap();

    assert!(matches!(
        session.submit_race_times(&grid()),
        Err(DerbyError::Validation(_))
    ));
    assert_eq!(
        RecordStore::new(&path).row_count(RACE_TIMES_SHEET).unwrap(),
        0
    );
}

#[test]
fn test_confirm_cmd() {
    let counts = confirm_cmd::run("2", " 1 ").unwrap();
    assert_eq!((counts.racers, counts.lanes), (2, 1));
    assert!(matches!(
        confirm_cmd::run("3", "1"),
        Err(DerbyError::Validation(_))
    ));
    assert!(matches!(
        confirm_cmd::run("x", "1"),
        Err(DerbyError::Parse { .. })
    ));
}

#[test]
fn test_cli_handlers_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = dir.path().join("derby.json");
    let csv_path = dir.path().join("times.csv");
    std::fs::write(&csv_path, GRID_CSV).unwrap();

    add_racer_cmd::run(workbook.clone(), racer("1", "Alex")).unwrap();
    add_racer_cmd::run(workbook.clone(), racer("2", "Sam")).unwrap();
    assert_eq!(add_times_cmd::run(workbook.clone(), csv_path.clone(), 2).unwrap(), 10);

    let out = dir.path().join("export").join("racers.csv");
    export_cmd::run(workbook.clone(), RACER_SHEET.to_string(), Some(out.clone())).unwrap();
    let exported = std::fs::read_to_string(&out).unwrap();
    let mut lines = exported.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Racer Number,Racer Name,Boy Scout Rank,Car Name,Car Number,Car Weight,Mods"
    );
    assert!(lines.next().unwrap().starts_with("1,Alex,Arrow of Light,Blue Streak,42,5.0,"));

    let out = dir.path().join("times_out.csv");
    export_cmd::run(workbook.clone(), RACE_TIMES_SHEET.to_string(), Some(out.clone())).unwrap();
    let exported = std::fs::read_to_string(&out).unwrap();
    assert_eq!(exported.lines().count(), 11);
    assert_eq!(exported.lines().nth(1).unwrap(), "1,1,5.1,2,5.2");
}

#[test]
fn test_add_times_bad_csv_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = dir.path().join("derby.json");
    let csv_path = dir.path().join("times.csv");
    std::fs::write(&csv_path, GRID_CSV.replace("9,1,5.10,2,5.20", "9,1,slow,2,5.20")).unwrap();

    match add_times_cmd::run(workbook.clone(), csv_path, 2) {
        Err(DerbyError::Parse { field, value }) => {
            assert_eq!(field, "Race 9: Racer 1 - Time");
            assert_eq!(value, "slow");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(!workbook.exists());
}

#[test]
fn test_export_unknown_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = dir.path().join("derby.json");
    add_racer_cmd::run(workbook.clone(), racer("1", "Alex")).unwrap();

    assert!(matches!(
        export_cmd::run(workbook, "Lap Times".to_string(), None),
        Err(DerbyError::NotFound(_))
    ));
}

fn write_script(dir: &std::path::Path, body: &str) -> PathBuf {
    let path = dir.join("session.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_run_script() {
    let dir = tempfile::tempdir().unwrap();
    let mut script = String::from(
        r#"
workbook = "derby.json"
racers = 2
lanes = "2"
method = "lane-scan"

[[racer]]
racer_number = 1
racer_name = "Alex"
car_name = "Blue Streak"
car_number = 42
car_weight = "5.0 oz"

[[racer]]
racer_number = "2"
racer_name = "Sam"
rank = "Webelos"
car_name = "Red Rocket"
car_number = "7"
car_weight = 4.8
mods = """
polished axles
rail rider"""
"#,
    );
    for i in 0..10 {
        // Racers swap lanes every race.
        let (l1, l2) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
        script.push_str(&format!(
            "\n[[race]]\nracer1_lane = {l1}\nracer1_time = 5.{}\nracer2_lane = {l2}\nracer2_time = \"5.25\"\n",
            10 + i
        ));
    }
    let script_path = write_script(dir.path(), &script);

    let report = run_cmd::run(
        script_path,
        None,
        None,
        None,
        AggregationMethod::Classic,
        None,
    )
    .unwrap();

    assert_eq!(report.method, AggregationMethod::LaneScan);
    assert_eq!(report.races, 10);
    // Lane 1: racer 1 ran races 1,3,5,7,9 at 5.10..5.18; racer 2 ran 5.25.
    assert_eq!(report.fastest[0].racer_name, "Alex");
    assert_eq!(report.fastest[0].time, Some(5.10));
    // Lane 2: racer 1 ran 5.11..5.19, faster than racer 2's 5.25.
    assert_eq!(report.fastest[1].racer_name, "Alex");
    assert_eq!(report.fastest[1].time, Some(5.11));

    let store = RecordStore::new(dir.path().join("derby.json"));
    let mods = store.load(RACER_SHEET).unwrap().column("Mods").unwrap()[1].as_text();
    assert_eq!(mods, "polished axles\nrail rider");
}

#[test]
fn test_run_script_stops_at_invalid_racer() {
    let dir = tempfile::tempdir().unwrap();
    let script_path = write_script(
        dir.path(),
        r#"
workbook = "derby.json"
racers = 1
lanes = 1

[[racer]]
racer_number = 1
racer_name = "Alex"
car_name = "Blue Streak"
car_number = 1000
car_weight = "5.0 oz"
"#,
    );

    let err = run_cmd::run(
        script_path,
        None,
        None,
        None,
        AggregationMethod::Classic,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, DerbyError::Validation(_)));
    assert!(!dir.path().join("derby.json").exists());
}
