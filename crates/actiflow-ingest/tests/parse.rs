use actiflow_core::row::UNASSIGNED_ACTOR;
use actiflow_ingest::{
    IngestOptions,
    error::{ErrorCode, Severity},
    parse_table,
};

#[test]
fn test_full_table() {
    let source = r#"Parcel handling export
Name,Actor,Input,Output,Description
Action A,Clerk,parcel,"label; scan",Receive the parcel
1.1,Clerk,,,Scan label
1.2,Driver,,,Load truck
Totals,,,,
Action B,,"label, scan",,
"#;

    let table = parse_table(source, &IngestOptions::default()).expect("Failed to parse");

    assert_eq!(table.rows.len(), 4);
    assert_eq!(table.ignored, 1);
    assert!(table.warnings.is_empty());

    let a = &table.rows[0];
    assert_eq!(a.name(), "Action A");
    assert!(!a.is_sub_action());
    assert_eq!(a.actor_name(), "Clerk");
    assert_eq!(a.inputs(), ["parcel"]);
    assert_eq!(a.outputs(), ["label", "scan"]);
    assert_eq!(a.documentation(), "Receive the parcel");

    let sub = &table.rows[2];
    assert!(sub.is_sub_action());
    assert_eq!(sub.parent_name(), Some("Action A"));
    assert_eq!(sub.actor_name(), "Driver");

    let b = &table.rows[3];
    assert_eq!(b.actor_name(), UNASSIGNED_ACTOR);
    assert_eq!(b.inputs(), ["label", "scan"]);
    assert!(b.outputs().is_empty());
}

#[test]
fn test_semicolon_table_detected() {
    let source = "Name;Input;Output\n1 Receive;a, b;c\n1.1 Scan;;\n";

    let table = parse_table(source, &IngestOptions::default()).expect("Failed to parse");

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].inputs(), ["a", "b"]);
    assert_eq!(table.rows[1].parent_name(), Some("1 Receive"));
}

#[test]
fn test_forced_delimiter() {
    let source = "Name|Actor\nAction A|X\n";

    let table = parse_table(source, &IngestOptions::default().with_delimiter('|'))
        .expect("Failed to parse");

    assert_eq!(table.rows[0].actor_name(), "X");
}

#[test]
fn test_orphan_sub_row_warning() {
    let source = "Name\n0.1 Prepare\nAction A\n";

    let table = parse_table(source, &IngestOptions::default()).expect("Failed to parse");

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.warnings.len(), 1);
    let warning = &table.warnings[0];
    assert_eq!(warning.severity(), Severity::Warning);
    assert_eq!(warning.code(), Some(ErrorCode::W100));
    let span = warning.labels()[0].span();
    assert_eq!(&source[span.start()..span.end()], "0.1 Prepare");
}

#[test]
fn test_empty_input() {
    let err = parse_table(" \n\t\n", &IngestOptions::default()).unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E000));
}

#[test]
fn test_missing_header() {
    let err = parse_table("Action A,X\nAction B,Y\n", &IngestOptions::default()).unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
    assert_eq!(err.to_string(), "error[E001]: header row not found");
}

#[test]
fn test_unterminated_quote() {
    let err = parse_table("Name,Input\nAction A,\"a;b\n", &IngestOptions::default()).unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E002));
}

#[test]
fn test_header_only() {
    let table = parse_table("Name,Actor\n", &IngestOptions::default()).expect("Failed to parse");
    assert!(table.rows.is_empty());
    assert_eq!(table.ignored, 0);
}
