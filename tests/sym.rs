use std::fs;

use can_sym::sym::{self, Diagnostic, SymParseError, SymSaveError};
use can_sym::{DatabaseSym, IdFormat, MuxRole, SignalSym, ValueType};
use tempfile::tempdir;

const COLLIDING_MUX: &str = "\
FormatVersion=5.0 // Do not edit this line!
Title=\"a file\"

{SEND}

[MuxedId]
ID=0h
Mux=TheMux 0,1 0h
Var=Signal unsigned 1,1

[MuxedId]
Mux=FirstMux 0,1 1h
Var=Signal unsigned 1,1

[MuxedId]
Mux=SecondMux 0,1 1h
Var=Signal unsigned 1,1
";

const VALUE_TABLES: &str = "\
FormatVersion=5.0 // Do not edit this line!
Title=\"AFE_CAN_ID0\"

{ENUMS}
enum State(0=\"Power On Reset, and a quoted comma\", 1=\"Ready,set,go\", 2=\"Following\",3=\"Fault\",
  4=\"Forming\", 5=\"N/A\", 6=\"N/A\",7=\"N/A\",8=\"N/A\",9=\"N/A\", 10=\"N/A\",11=\"N/A\",
  12=\"N/A\", 13=\"N/A\",14=\"N/A\", 15=\"N/A\")
enum Relay(0=\"Open\", 1=\"Closed\",2=\"Error\",3=\"N/A\")

{SENDRECEIVE}
[StatusBits]
ID=0CFFC3F7h
Type=Extended
DLC=8
Var=State_status unsigned 0,16 /e:State
Var=MX2Permissive_status unsigned 32,16 /e:Relay
";

const GEARBOX: &str = "\
FormatVersion=5.0 // Do not edit this line!
Title=\"Gearbox\"

{ENUMS}
enum Gear(0=\"Park\", 1=\"Reverse\", 2=\"Neutral\", 3=\"Drive\")

{SEND}

[Command]
ID=1A0h // shift request
DLC=4
CycleTime=20
Var=Requested unsigned 0,4 /e:Gear /d:0
Var=Torque signed 8,16 -m /u:Nm /f:0.1 /o:-500 /min:-500 /max:1000.50 /d:0.0
Var=\"Oil Temp\" float 24,32 /u:\"deg C\" /p:1 /ln:\"Oil temperature: sump\"

{RECEIVE}

[Diag]
ID=18DAF110h
Type=Extended
DLC=8
Var=Always bit 63,1 // ready flag
Mux=Voltage 0,8 1h // page 1
Var=Battery unsigned 8,16 /u:V /f:0.001
[Diag]
Mux=Current 0,8 2h
Var=Load signed 8,16 /u:A /f:0.01
";

fn values(db: &DatabaseSym, table: &str) -> Vec<(i64, String)> {
    db.value_table(table)
        .unwrap()
        .entries
        .iter()
        .map(|(code, label)| (*code, label.clone()))
        .collect()
}

#[test]
fn test_colliding_mux_values() {
    let (db, diagnostics) = sym::parse(COLLIDING_MUX);
    assert_eq!(diagnostics.len(), 1);

    let error: &Diagnostic = &diagnostics[0];
    assert!(matches!(error, Diagnostic::DuplicateMuxValue { .. }));
    assert_eq!(error.line(), 16);

    let text: String = error.to_string();
    assert!(text.starts_with("line 16: "), "{text}");
    assert!(text.contains("FirstMux"));
    assert!(text.contains("SecondMux"));

    // first claim stays authoritative, signals are still attached
    let frame = db.get_frame_by_name("MuxedId").unwrap();
    assert_eq!(frame.mux_groups[&1].name, "FirstMux");
    assert_eq!(frame.mux_groups[&1].line, 12);
    let muxed: Vec<Option<u32>> = frame
        .signals
        .iter()
        .filter(|s| s.mux_role == MuxRole::Multiplexed)
        .map(|s| s.mux_value)
        .collect();
    assert_eq!(muxed, vec![Some(0), Some(1), Some(1)]);
}

#[test]
fn test_parse_long_name_with_colon() {
    let text: &str = "\
FormatVersion=5.0 // Do not edit this line!
Title=\"a file\"

{SEND}

[pass]
DLC=8
Var=Password unsigned 16,16 /ln:\"Access Level : Password\"
";
    let (db, diagnostics) = sym::parse(text);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let signal: &SignalSym = &db.iter_frames().next().unwrap().signals[0];
    assert_eq!(signal.long_name(), Some("Access Level : Password"));
    assert_eq!(
        signal.attributes.get("LongName").map(String::as_str),
        Some("Access Level : Password")
    );
}

#[test]
fn test_parse_float_and_double() {
    for (keyword, bit_length) in [("float", 32), ("double", 64)] {
        let text: String = format!(
            "FormatVersion=5.0 // Do not edit this line!\nTitle=\"Untitled\"\n\n{{SENDRECEIVE}}\n\n[Symbol1]\nID=000h\nDLC=8\nVar=a_signal {keyword} 0,{bit_length}\n"
        );
        let (db, diagnostics) = sym::parse(&text);
        assert!(diagnostics.is_empty(), "{keyword}: {diagnostics:?}");
        let signal: &SignalSym = &db.iter_frames().next().unwrap().signals[0];
        assert!(signal.is_float());
        assert_eq!(signal.bit_length, bit_length);
    }
}

#[test]
fn test_float_with_wrong_length_is_reported_and_fixed() {
    let text: &str = "{SEND}\n[F]\nVar=x double 0,32\n";
    let (db, diagnostics) = sym::parse(text);
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        diagnostics[0],
        Diagnostic::FloatLengthMismatch { line: 3, declared: 32, expected: 64, .. }
    ));
    assert_eq!(db.get_frame_by_name("F").unwrap().signals[0].bit_length, 64);
}

#[test]
fn test_value_tables() {
    let (db, diagnostics) = sym::parse(VALUE_TABLES);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(db.value_tables.len(), 2);

    let relay: Vec<(i64, String)> = ["Open", "Closed", "Error", "N/A"]
        .iter()
        .enumerate()
        .map(|(i, l)| (i as i64, l.to_string()))
        .collect();
    assert_eq!(values(&db, "Relay"), relay);

    let mut state: Vec<(i64, String)> = vec![
        (0, "Power On Reset, and a quoted comma".to_string()),
        (1, "Ready,set,go".to_string()),
        (2, "Following".to_string()),
        (3, "Fault".to_string()),
        (4, "Forming".to_string()),
    ];
    state.extend((5..=15).map(|code| (code, "N/A".to_string())));
    assert_eq!(values(&db, "State"), state);

    let frame = db.get_frame_by_name("StatusBits").unwrap();
    assert_eq!(frame.id, 0x0CFF_C3F7);
    assert_eq!(frame.id_format, IdFormat::Extended);
    assert_eq!(frame.signals[0].value_table.as_deref(), Some("State"));
    assert_eq!(frame.signals[1].value_table.as_deref(), Some("Relay"));
}

#[test]
fn test_unknown_enum_reference() {
    let text: &str = "{SEND}\n[F]\nVar=x unsigned 0,2 /e:Later\n{ENUMS}\nenum Later(0=\"a\")\n";
    let (db, diagnostics) = sym::parse(text);
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::UnknownValueTable { line: 3, name, .. } if name == "Later"
    ));
    assert_eq!(db.get_frame_by_name("F").unwrap().signals[0].value_table, None);
    assert!(db.value_table("Later").is_some());
}

#[test]
fn test_document_round_trip() {
    let (db, diagnostics) = sym::parse(GEARBOX);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let text: String = sym::to_string(&db).unwrap();
    let (again, diagnostics) = sym::parse(&text);
    assert!(diagnostics.is_empty(), "{diagnostics:?}\n{text}");

    assert_eq!(again.title, db.title);
    assert_eq!(again.value_tables, db.value_tables);
    assert_eq!(again.frames_order.len(), db.frames_order.len());

    for (a, b) in again.iter_frames().zip(db.iter_frames()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id_format, b.id_format);
        assert_eq!(a.byte_length, b.byte_length);
        assert_eq!(a.cycle_time, b.cycle_time);
        assert_eq!(a.direction, b.direction);
        assert_eq!(a.comment, b.comment);
        assert_eq!(a.signals, b.signals, "{text}");
        let groups = |f: &can_sym::FrameSym| -> Vec<(u32, String, String)> {
            f.mux_groups
                .iter()
                .map(|(v, g)| (*v, g.name.clone(), g.comment.clone()))
                .collect()
        };
        assert_eq!(groups(a), groups(b));
    }

    // numbers come back with the digits they were written with
    let torque: &SignalSym = again
        .get_frame_by_name("Command")
        .unwrap()
        .signal_by_name("Torque")
        .unwrap();
    assert_eq!(torque.max.as_ref().unwrap().as_str(), "1000.50");
    assert_eq!(torque.initial_value.as_ref().unwrap().as_str(), "0.0");
    assert_eq!(torque.value_type, ValueType::Signed);

    let oil: &SignalSym = again
        .get_frame_by_name("Command")
        .unwrap()
        .signal_by_name("Oil Temp")
        .unwrap();
    assert_eq!(oil.unit, "deg C");
    assert_eq!(oil.long_name(), Some("Oil temperature: sump"));
}

#[test]
fn test_from_file_windows_1252() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("body.sym");
    let mut bytes: Vec<u8> = b"FormatVersion=5.0\n{SEND}\n[Door]\nID=100h // T".to_vec();
    bytes.extend_from_slice(b"\xFCr\nDLC=1\nVar=Temp unsigned 0,8 /u:\xB0C\n");
    fs::write(&path, bytes).unwrap();

    let (db, diagnostics) = sym::from_file(path.to_str().unwrap()).unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let frame = db.get_frame_by_name("door").unwrap();
    assert_eq!(frame.comment, "Tür");
    assert_eq!(frame.signals[0].unit, "°C");
}

#[test]
fn test_from_file_errors() {
    let err = sym::from_file("bus.dbc").unwrap_err();
    assert!(matches!(err, SymParseError::InvalidExtension { .. }));

    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.sym");
    let err = sym::from_file(missing.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, SymParseError::OpenFile { .. }));
}

#[test]
fn test_save_to_file_and_reload() {
    let (db, _) = sym::parse(GEARBOX);
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("gearbox.sym");
    sym::save_to_file(path.to_str().unwrap(), &db).unwrap();

    let (again, diagnostics) = sym::from_file(path.to_str().unwrap()).unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(again.frames_order.len(), 2);
    assert!(again.get_frame_by_id(0x18DA_F110).unwrap().is_multiplexed());

    let err = sym::save_to_file(dir.path().join("gearbox.txt").to_str().unwrap(), &db).unwrap_err();
    assert!(matches!(err, SymSaveError::InvalidExtension { .. }));
}

#[test]
fn test_multiline_enum_reports_entry_lines() {
    let text: &str = "\
{ENUMS}
enum Mode(0=\"Off\",
  on=\"On\",
  2=\"Auto\", 2=\"Again\")
";
    let (db, diagnostics) = sym::parse(text);
    let lines: Vec<usize> = diagnostics.iter().map(Diagnostic::line).collect();
    assert_eq!(lines, vec![3, 4]);
    assert!(matches!(diagnostics[0], Diagnostic::MalformedEnumEntry { .. }));
    assert!(matches!(diagnostics[1], Diagnostic::DuplicateEnumCode { code: 2, .. }));
    assert_eq!(values(&db, "Mode"), vec![(0, "Off".to_string()), (2, "Auto".to_string())]);
}
