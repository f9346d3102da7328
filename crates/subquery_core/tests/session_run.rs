use rusqlite::Connection;
use subquery_core::{
    open_sample_in_memory, steps, Selection, StepOutcome, StepSink, Walkthrough,
    WalkthroughError, WalkthroughResult,
};

#[test]
fn full_session_runs_every_step_in_order() {
    let conn = open_sample_in_memory().unwrap();
    let mut outcomes: Vec<StepOutcome> = Vec::new();

    let summary = Walkthrough::default().run(conn, &mut outcomes).unwrap();

    let numbers: Vec<u32> = outcomes.iter().map(|outcome| outcome.step.number).collect();
    let expected: Vec<u32> = steps().iter().map(|step| step.number).collect();
    assert_eq!(numbers, expected);
    assert_eq!(summary.steps_run, steps().len());
    // 10 + 10 + 11 + 1 + 6
    assert_eq!(summary.rows_returned, 38);
}

#[test]
fn selected_steps_run_in_catalogue_order() {
    let conn = open_sample_in_memory().unwrap();
    let mut outcomes: Vec<StepOutcome> = Vec::new();
    let selection = Selection::from_numbers([6, 3]).unwrap();

    Walkthrough::new(selection).run(conn, &mut outcomes).unwrap();

    let numbers: Vec<u32> = outcomes.iter().map(|outcome| outcome.step.number).collect();
    assert_eq!(numbers, vec![3, 6]);
}

#[test]
fn first_failing_step_stops_the_session() {
    // Schema passes a table-level check but lacks `payments.amount`.
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE offices (officeCode TEXT PRIMARY KEY, country TEXT);
         CREATE TABLE employees (
             employeeNumber INTEGER PRIMARY KEY,
             lastName TEXT,
             firstName TEXT,
             officeCode TEXT
         );
         CREATE TABLE customers (
             customerNumber INTEGER PRIMARY KEY,
             country TEXT,
             salesRepEmployeeNumber INTEGER
         );
         CREATE TABLE payments (customerNumber INTEGER);",
    )
    .unwrap();

    let mut outcomes: Vec<StepOutcome> = Vec::new();
    let selection = Selection::from_numbers([2, 5, 6]).unwrap();
    let err = Walkthrough::new(selection)
        .run(conn, &mut outcomes)
        .unwrap_err();

    match err {
        WalkthroughError::Query { step, source } => {
            assert_eq!(step, 5);
            assert!(source.to_string().contains("amount"));
        }
        other => panic!("unexpected error: {other}"),
    }
    let numbers: Vec<u32> = outcomes.iter().map(|outcome| outcome.step.number).collect();
    assert_eq!(numbers, vec![2]);
}

struct FailingSink;

impl StepSink for FailingSink {
    fn emit(&mut self, _outcome: &StepOutcome) -> WalkthroughResult<()> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
    }
}

#[test]
fn sink_failure_is_reported_as_output_error() {
    let conn = open_sample_in_memory().unwrap();
    let err = Walkthrough::default().run(conn, &mut FailingSink).unwrap_err();
    assert!(matches!(err, WalkthroughError::Output(_)));
}
