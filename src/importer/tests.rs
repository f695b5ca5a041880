//! Unit tests for the attendance CSV importer.

use super::{AttendanceCsvImporter, ImportError, ImportResult, RowErrorKind, import_attendance_csv};
use crate::config::ImportConfig;
use crate::models::{AttendanceKey, AttendanceStatus, Overstay};
use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeMap, HashSet};

const HEADER: &str = "EP NO,Name,Date,Status,In,Out";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn import(csv: &str) -> ImportResult {
    import_attendance_csv(csv, &HashSet::new()).unwrap()
}

fn csv(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text
}

#[test]
fn test_minimal_roundtrip() {
    let result = import("EP NO,Name,Date,Status,In,Out\nE1,Jane,2023-10-01,Present,09:00,17:00");

    assert_eq!(result.summary.total, 1);
    assert_eq!(result.summary.success, 1);
    assert_eq!(result.summary.updated, 0);
    assert_eq!(result.summary.errors, 0);
    assert_eq!(result.records.len(), 1);

    let record = &result.records[0];
    assert_eq!(record.employee_id, "E1");
    assert_eq!(record.name, "Jane");
    assert_eq!(record.date, date(2023, 10, 1));
    assert_eq!(record.status, AttendanceStatus::Present);
    assert_eq!(record.in_time, Some(time(9, 0)));
    assert_eq!(record.out_time, Some(time(17, 0)));
    assert_eq!(record.company, None);
    assert_eq!(record.overstay, None);
}

#[test]
fn test_all_valid_rows_accepted() {
    let result = import(&csv(&[
        "E1,Jane,2023-10-01,Present,09:00,17:00",
        "E2,John,2023-10-01,Absent,,",
        "E3,Mary,2023-10-01,Holiday,,",
        "E4,Ali,2023-10-01,Half Day,09:00,13:00",
    ]));

    assert_eq!(result.summary.total, 4);
    assert_eq!(result.summary.success + result.summary.updated, result.summary.total);
    assert_eq!(result.summary.errors, 0);
    assert!(result.is_clean());
    assert_eq!(result.records[3].status, AttendanceStatus::HalfDay);
}

#[test]
fn test_present_without_in_time() {
    let result = import(&csv(&["E1,Jane,2023-10-01,Present,,17:00", "E2,John,2023-10-01,Absent,,"]));

    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.kind, RowErrorKind::InvalidTime);
    assert_eq!(error.row, 1);
    assert_eq!(error.column.as_deref(), Some("In"));
    assert!(result.records.iter().all(|r| r.employee_id != "E1"));
    assert_eq!(result.summary.success, 1);
}

#[test]
fn test_invalid_calendar_date() {
    let result = import(&csv(&["E1,Jane,2023-02-30,Absent,,", "E2,John,2023-02-28,Absent,,"]));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, RowErrorKind::InvalidDate);
    assert_eq!(result.errors[0].row, 1);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].date, date(2023, 2, 28));
}

#[test]
fn test_missing_status_column_aborts() {
    let err = import_attendance_csv(
        "EP NO,Name,Date,In,Out\nE1,Jane,2023-10-01,09:00,17:00",
        &HashSet::new(),
    )
    .unwrap_err();

    match err {
        ImportError::MissingRequiredColumn(missing) => assert_eq!(missing, vec!["Status".to_string()]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_existing_key_counts_as_update() {
    let mut existing = HashSet::new();
    existing.insert(AttendanceKey::new("E001", date(2023, 10, 1)));

    let text = csv(&["E001,Jane,2023-10-01,Present,09:00,17:00", "E002,John,2023-10-01,Absent,,"]);
    let result = import_attendance_csv(&text, &existing).unwrap();

    assert_eq!(result.summary.updated, 1);
    assert_eq!(result.summary.success, 1);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].employee_id, "E001");
}

#[test]
fn test_idempotent() {
    let text = csv(&[
        "E1,Jane,2023-10-01,Present,09:00,17:00",
        "E2,John,2023-10-01,Bogus,,",
        "E3,Mary,2023-10-01",
    ]);
    let mut existing = HashSet::new();
    existing.insert(AttendanceKey::new("E1", date(2023, 10, 1)));

    let first = import_attendance_csv(&text, &existing).unwrap();
    let second = import_attendance_csv(&text, &existing).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_empty_input() {
    for text in ["", "   ", "\n\n", "\u{feff}"] {
        assert!(matches!(
            import_attendance_csv(text, &HashSet::new()),
            Err(ImportError::EmptyInput)
        ));
    }
}

#[test]
fn test_header_only_input() {
    assert!(matches!(
        import_attendance_csv(HEADER, &HashSet::new()),
        Err(ImportError::EmptyInput)
    ));
    assert!(matches!(
        import_attendance_csv(&format!("{HEADER}\n\n  \n"), &HashSet::new()),
        Err(ImportError::EmptyInput)
    ));
}

#[test]
fn test_malformed_row_does_not_abort() {
    let result = import(&csv(&[
        "E1,Jane,2023-10-01",
        "E2,John,2023-10-01,Absent,,,extra",
        "E3,Mary,2023-10-01,Absent,,",
    ]));

    assert_eq!(result.summary.total, 3);
    assert_eq!(result.summary.errors, 2);
    assert!(result.errors.iter().all(|e| e.kind == RowErrorKind::MalformedRow));
    assert!(result.errors.iter().all(|e| e.column.is_none()));
    assert_eq!(result.errors[1].row, 2);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].employee_id, "E3");
}

#[test]
fn test_required_field_missing_reports_first_in_header_order() {
    let result = import("Status,Name,EP NO,Date,In,Out\n,,E1,2023-10-01,,");

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, RowErrorKind::RequiredFieldMissing);
    assert_eq!(result.errors[0].column.as_deref(), Some("Status"));
}

#[test]
fn test_one_error_per_row() {
    // Bad date, bad status, and bad times all on one row.
    let result = import(&csv(&["E1,Jane,2023-99-99,Nope,xx,yy"]));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, RowErrorKind::InvalidDate);
}

#[test]
fn test_rules_run_in_order_regardless_of_header_order() {
    // Status precedes Date in the header, yet the date rule runs first.
    let result = import("Status,Date,EP NO,Name,In,Out\nBogus,2023-02-30,E1,Jane,,");

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, RowErrorKind::InvalidDate);
    assert_eq!(result.errors[0].column.as_deref(), Some("Date"));
}

#[test]
fn test_status_is_case_sensitive() {
    let result = import(&csv(&["E1,Jane,2023-10-01,present,09:00,17:00", "E2,John,2023-10-01,HalfDay,09:00,13:00"]));

    assert_eq!(result.summary.errors, 2);
    assert!(result.errors.iter().all(|e| e.kind == RowErrorKind::InvalidStatus));
}

#[test]
fn test_invalid_time_values() {
    let result = import(&csv(&[
        "E1,Jane,2023-10-01,Present,24:00,17:00",
        "E2,John,2023-10-01,Present,09:00,9:30",
        "E3,Mary,2023-10-01,Half Day,09:00,",
    ]));

    assert_eq!(result.summary.errors, 3);
    assert!(result.errors.iter().all(|e| e.kind == RowErrorKind::InvalidTime));
    let columns: Vec<_> = result.errors.iter().map(|e| e.column.as_deref()).collect();
    assert_eq!(columns, vec![Some("In"), Some("Out"), Some("Out")]);
}

#[test]
fn test_times_ignored_for_absent_and_holiday() {
    let result = import(&csv(&["E1,Jane,2023-10-01,Absent,garbage,17:00", "E2,John,2023-10-01,Holiday,18:00,08:00"]));

    assert!(result.is_clean());
    assert!(result.records.iter().all(|r| r.in_time.is_none() && r.out_time.is_none()));
}

#[test]
fn test_out_before_in_rejected() {
    let result = import(&csv(&["E1,Jane,2023-10-01,Present,22:00,06:00", "E2,John,2023-10-01,Present,09:00,09:00"]));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, RowErrorKind::TimeOrderInvalid);
    assert_eq!(result.errors[0].row, 1);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].employee_id, "E2");
}

#[test]
fn test_optional_columns() {
    let result = import(
        "Company,EP NO,Name,Date,Status,In,Out,Shift,Overstay\n\
         Innovate Inc.,E1,Jane,2023-10-01,Present,09:00,17:00,General,1:30\n\
         ,E2,John,2023-10-01,Present,09:00,17:00,,\n\
         Tech Solutions,E3,Mary,2023-10-01,Present,09:00,17:00,Night,soon",
    );

    assert!(result.is_clean());
    assert_eq!(result.records[0].company.as_deref(), Some("Innovate Inc."));
    assert_eq!(result.records[0].shift.as_deref(), Some("General"));
    assert_eq!(result.records[0].overstay, Some(Overstay { minutes: 90 }));
    assert_eq!(result.records[1].company, None);
    assert_eq!(result.records[1].overstay, None);
    assert_eq!(result.records[2].overstay, None);
}

#[test]
fn test_quoted_fields() {
    let result = import(
        "EP NO,Name,Date,Status,In,Out,Company\n\
         E1,\"Doe, Jane\",2023-10-01,Present,09:00,17:00,\"Big \"\"Co\"\"\"\n\
         E2,\"Multi\nLine\",2023-10-01,Absent,,,\n\
         E3,John,2023-10-01,Bogus,,,",
    );

    assert_eq!(result.summary.total, 3);
    assert_eq!(result.records[0].name, "Doe, Jane");
    assert_eq!(result.records[0].company.as_deref(), Some("Big \"Co\""));
    assert_eq!(result.records[1].name, "Multi\nLine");
    assert_eq!(result.errors[0].row, 3);
    assert_eq!(result.errors[0].line, 5);
}

#[test]
fn test_leading_blank_lines_and_bom() {
    let result = import("\u{feff}\n\nEP NO,Name,Date,Status,In,Out\nE1,Jane,2023-10-01,Bogus,,\n");

    assert_eq!(result.summary.total, 1);
    assert_eq!(result.errors[0].row, 1);
    assert_eq!(result.errors[0].line, 4);
}

#[test]
fn test_line_numbers_with_crlf() {
    let result = import("EP NO,Name,Date,Status,In,Out\r\nE1,Jane,2023-10-01,Absent,,\r\nE2,John,2023-10-01,Bogus,,\r\n");

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 2);
    assert_eq!(result.errors[0].line, 3);
}

#[test]
fn test_line_numbers_skip_blank_lines() {
    let result = import(&format!("{HEADER}\n\nE1,Jane,2023-10-01,Bogus,,\n   \nE2,John\n"));

    let positions: Vec<_> = result.errors.iter().map(|e| (e.row, e.line)).collect();
    assert_eq!(positions, vec![(1, 3), (2, 5)]);

    let result = import(&format!("{HEADER}\r\n\r\nE1,Jane,2023-10-01,Bogus,,"));
    assert_eq!(result.errors[0].row, 1);
    assert_eq!(result.errors[0].line, 3);
}

#[test]
fn test_line_numbers_after_leading_blank_crlf_lines() {
    let result = import("\r\n\r\nEP NO,Name,Date,Status,In,Out\r\nE1,Jane,2023-10-01,Absent,,\r\n\r\nE2,John,2023-10-01,Bogus,,");

    assert_eq!(result.errors[0].row, 2);
    assert_eq!(result.errors[0].line, 6);
}

#[test]
fn test_device_export_header_aliases() {
    let result = import(
        "EP NO,EP NAME,PunchDate,Status,PUNCH1 IN,PUNCH2 OUT,Contractor Name\n\
         E1,Jane,2023-10-01,Present,09:00,17:00,Future Corp",
    );

    assert!(result.is_clean());
    let record = &result.records[0];
    assert_eq!(record.name, "Jane");
    assert_eq!(record.date, date(2023, 10, 1));
    assert_eq!(record.in_time, Some(time(9, 0)));
    assert_eq!(record.out_time, Some(time(17, 0)));
    assert_eq!(record.company.as_deref(), Some("Future Corp"));
}

#[test]
fn test_configured_header_aliases() {
    let mut column_aliases = BTreeMap::new();
    column_aliases.insert("Emp Code".to_string(), "EP NO".to_string());
    column_aliases.insert("Day".to_string(), "date".to_string());

    let importer = AttendanceCsvImporter::new(ImportConfig {
        column_aliases,
        ..ImportConfig::default()
    })
    .unwrap();
    let result = importer
        .import("emp code,Name,DAY,Status,In,Out\nE9,Jane,2023-10-01,Absent,,", &HashSet::new())
        .unwrap();

    assert!(result.is_clean());
    assert_eq!(result.records[0].employee_id, "E9");

    // Without the alias the column is unknown.
    assert!(matches!(
        AttendanceCsvImporter::default().import("emp code,Name,Date,Status,In,Out\nE9,Jane,2023-10-01,Absent,,", &HashSet::new()),
        Err(ImportError::MissingRequiredColumn(missing)) if missing == vec!["EP NO".to_string()]
    ));
}

#[test]
fn test_new_rejects_invalid_settings() {
    for delimiter in ['§', '"', '\n'] {
        let config = ImportConfig {
            delimiter,
            ..ImportConfig::default()
        };
        assert!(AttendanceCsvImporter::new(config).is_err(), "delimiter {delimiter:?}");
    }

    let mut column_aliases = BTreeMap::new();
    column_aliases.insert("Remarks".to_string(), "Comment".to_string());
    assert!(
        AttendanceCsvImporter::new(ImportConfig {
            column_aliases,
            ..ImportConfig::default()
        })
        .is_err()
    );
}

#[test]
fn test_columns_bound_by_name() {
    let result = import("out,IN,status,date,name,ep no,Notes\n17:00,09:00,Present,2023-10-01,Jane,E1,late bus");

    assert!(result.is_clean());
    assert_eq!(result.records[0].employee_id, "E1");
    assert_eq!(result.records[0].out_time, Some(time(17, 0)));
}

#[test]
fn test_fields_are_trimmed_by_default() {
    let result = import(&csv(&[" E1 , Jane , 2023-10-01 , Present , 09:00 , 17:00 "]));

    assert!(result.is_clean());
    assert_eq!(result.records[0].employee_id, "E1");

    let strict = AttendanceCsvImporter::new(ImportConfig {
        trim_fields: false,
        ..ImportConfig::default()
    })
    .unwrap();
    let result = strict
        .import(&csv(&["E1,Jane,2023-10-01, Present,09:00,17:00"]), &HashSet::new())
        .unwrap();
    assert_eq!(result.errors[0].kind, RowErrorKind::InvalidStatus);
}

#[test]
fn test_delimiter_config() {
    let text = "EP NO;Name;Date;Status;In;Out\nE1;Jane;2023-10-01;Present;09:00;17:00";

    let semicolon = AttendanceCsvImporter::new(ImportConfig {
        delimiter: ';',
        ..ImportConfig::default()
    })
    .unwrap();
    assert!(semicolon.import(text, &HashSet::new()).unwrap().is_clean());

    let detect = AttendanceCsvImporter::new(ImportConfig {
        detect_delimiter: true,
        ..ImportConfig::default()
    })
    .unwrap();
    assert_eq!(detect.import(text, &HashSet::new()).unwrap().summary.success, 1);

    // A comma importer sees a single unknown column.
    assert!(matches!(
        AttendanceCsvImporter::default().import(text, &HashSet::new()),
        Err(ImportError::MissingRequiredColumn(_))
    ));
}

#[test]
fn test_in_file_duplicates() {
    let text = csv(&[
        "E1,Jane,2023-10-01,Present,09:00,17:00",
        "E1,Jane,2023-10-01,Present,10:00,17:00",
    ]);

    let default = import(&text);
    assert_eq!(default.summary.success, 2);
    assert_eq!(default.summary.updated, 0);

    let flagging = AttendanceCsvImporter::new(ImportConfig {
        flag_in_file_duplicates: true,
        ..ImportConfig::default()
    })
    .unwrap();
    let result = flagging.import(&text, &HashSet::new()).unwrap();
    assert_eq!(result.summary.success, 1);
    assert_eq!(result.summary.updated, 1);
    assert_eq!(result.records.len(), 2);
}

#[test]
fn test_error_report() {
    let result = import(&csv(&["E1,Jane,2023-02-30,Absent,,", "E2,John"]));
    let report = result.error_report();
    let lines: Vec<_> = report.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Row 1 (line 2) [Date]: Invalid date '2023-02-30'"));
    assert_eq!(lines[1], "Row 2 (line 3): Expected 6 fields, found 2");
}
