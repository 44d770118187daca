use std::fs;
use std::path::PathBuf;

use csv_export::{
    BufferedResponse, CsvFormat, ErrorKind, ExportError, HeaderSet, HttpResponseWriter, Record,
    Result, Row, TabularExporter,
};

fn people() -> Vec<Record> {
    vec![
        Record::keyed([("name", "Ann"), ("age", "30")]),
        Record::keyed([("name", "Bo, Jr."), ("age", "25")]),
    ]
}

fn read_all(exporter: &TabularExporter, path: &std::path::Path) -> Vec<Row> {
    exporter
        .read_from(path)
        .expect("open csv")
        .collect::<Result<_>>()
        .expect("decode csv")
}

#[test]
fn save_creates_missing_directories() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("nested/deeper/people.csv");

    let mut exporter = TabularExporter::new(people(), ["name", "age"]);
    exporter.save(&path).expect("save csv");

    let written = fs::read_to_string(&path).expect("read saved file");
    assert_eq!(written, "name,age\nAnn,30\n\"Bo, Jr.\",25\n");
}

#[test]
fn save_twice_overwrites_with_identical_content() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("people.csv");
    fs::write(&path, "old content that is longer than the new one\n".repeat(10))
        .expect("seed file");

    let mut exporter = TabularExporter::new(people(), HeaderSet::Derived);
    exporter.save(&path).expect("first save");
    let first = fs::read(&path).expect("read first");
    exporter.save(&path).expect("second save");
    let second = fs::read(&path).expect("read second");

    assert_eq!(first, second);
    assert_eq!(first, exporter.csv_result().unwrap().as_bytes());
}

#[test]
fn save_rejects_read_only_destination() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("locked.csv");
    fs::write(&path, "keep me\n").expect("seed file");

    let mut permissions = fs::metadata(&path).expect("metadata").permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&path, permissions.clone()).expect("set read-only");

    let mut exporter = TabularExporter::new(people(), HeaderSet::Derived);
    let err = exporter.save(&path).unwrap_err();
    assert!(matches!(err, ExportError::FileNotWritable { .. }));
    assert_eq!(err.kind(), ErrorKind::FileAccess);
    assert_eq!(fs::read_to_string(&path).expect("read"), "keep me\n");

    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    fs::set_permissions(&path, permissions).expect("restore permissions");
}

#[cfg(unix)]
#[test]
fn save_rejects_destination_without_owner_write() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("shared.csv");
    fs::write(&path, "keep me\n").expect("seed file");

    // Group may write, owner may not: the read-only flag is clear.
    fs::set_permissions(&path, fs::Permissions::from_mode(0o020)).expect("chmod");
    assert!(!fs::metadata(&path).expect("metadata").permissions().readonly());

    // Permission bits do not bind a privileged user.
    if fs::OpenOptions::new().write(true).open(&path).is_ok() {
        return;
    }

    let mut exporter = TabularExporter::new(people(), HeaderSet::Derived);
    let err = exporter.save(&path).unwrap_err();
    assert!(matches!(err, ExportError::FileNotWritable { .. }));

    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("restore");
    assert_eq!(fs::read_to_string(&path).expect("read"), "keep me\n");
}

#[test]
fn save_fails_when_parent_is_a_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").expect("seed file");

    let mut exporter = TabularExporter::new(people(), HeaderSet::Derived);
    let err = exporter.save(&blocker.join("out.csv")).unwrap_err();
    assert!(err.is_file_access());
}

#[test]
fn save_empty_dataset_writes_empty_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("empty.csv");

    let mut exporter = TabularExporter::new(Vec::new(), ["a", "b"]);
    exporter.save(&path).expect("save csv");

    assert_eq!(fs::read_to_string(&path).expect("read"), "");
    assert_eq!(exporter.csv_result(), Some(""));
}

#[test]
fn chained_process_save_download() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("out/people.csv");
    let mut response = BufferedResponse::new();

    let mut exporter = TabularExporter::new(people(), ["name", "age"]);
    exporter
        .process()
        .expect("process")
        .download_as(&mut response, "people")
        .expect("download")
        .save(&path)
        .expect("save");

    let saved = fs::read_to_string(&path).expect("read");
    assert_eq!(response.body_str(), Some(saved.as_str()));
}

#[test]
fn round_trip_through_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("round.csv");

    let data = vec![
        Record::keyed([("id", "1"), ("note", "plain")]),
        Record::keyed([("id", "2"), ("note", "comma, inside")]),
        Record::keyed([("id", "3"), ("note", "quote \"here\"")]),
        Record::keyed([("id", "4"), ("note", "multi\nline")]),
        Record::keyed([("id", "5"), ("note", "")]),
    ];
    let mut exporter = TabularExporter::new(data, HeaderSet::Derived);
    exporter.save(&path).expect("save");

    let rows = read_all(&exporter, &path);
    assert_eq!(rows[0], vec!["id", "note"]);
    assert_eq!(rows[1], vec!["1", "plain"]);
    assert_eq!(rows[2], vec!["2", "comma, inside"]);
    assert_eq!(rows[3], vec!["3", "quote \"here\""]);
    assert_eq!(rows[4], vec!["4", "multi\nline"]);
    assert_eq!(rows[5], vec!["5", ""]);
    assert_eq!(rows.len(), 6);
}

#[test]
fn round_trip_keeps_backslashes_in_quoted_fields() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("paths.csv");

    let data = vec![
        Record::indexed(["C:\\dir, sub", "say \\\"hi\\\""]),
        Record::indexed(["D:\\data\\", "\\\"", "plain\\path"]),
    ];
    let mut exporter = TabularExporter::new(data, HeaderSet::Omitted);
    exporter.save(&path).expect("save");

    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "\"C:\\dir, sub\",\"say \\\"\"hi\\\"\"\"\nD:\\data\\,\"\\\"\"\",plain\\path\n"
    );

    let rows = read_all(&exporter, &path);
    assert_eq!(rows, vec![
        vec!["C:\\dir, sub", "say \\\"hi\\\""],
        vec!["D:\\data\\", "\\\"", "plain\\path"],
    ]);
}

#[test]
fn round_trip_with_custom_dialect() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("semi.csv");
    let format = CsvFormat::default()
        .with_delimiter(b';')
        .with_enclosure(b'\'');

    let data = vec![Record::indexed(["a;b", "it's", "plain"])];
    let mut exporter = TabularExporter::new(data, HeaderSet::Omitted).with_format(format);
    exporter.save(&path).expect("save");

    let rows = read_all(&exporter, &path);
    assert_eq!(rows, vec![vec!["a;b", "it's", "plain"]]);
}

#[test]
fn read_from_missing_path_fails_before_rows() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let exporter = TabularExporter::default();

    let err = exporter
        .read_from(&dir.path().join("nope.csv"))
        .unwrap_err();
    assert!(matches!(err, ExportError::FileNotFound { .. }));
    assert!(err.is_file_access());
}

#[test]
fn read_from_is_lazy_and_releases_on_early_break() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path: PathBuf = dir.path().join("big.csv");
    let mut contents = String::from("ID,VALUE\n");
    for i in 1..=1000 {
        contents.push_str(&format!("{},{}\n", i, i * 10));
    }
    fs::write(&path, contents).expect("write file");

    let exporter = TabularExporter::default();
    let mut rows = exporter.read_from(&path).expect("open");
    let first: Vec<Row> = rows.by_ref().take(3).collect::<Result<_>>().expect("decode");
    assert_eq!(first[2], vec!["2", "20"]);
    assert_eq!(rows.rows_read(), 3);
    assert!(rows.is_open());
    drop(rows);

    // A fresh call starts over.
    let again = exporter.read_from(&path).expect("reopen");
    assert_eq!(again.count(), 1001);
}

#[test]
fn read_from_last_line_without_newline() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("tail.csv");
    fs::write(&path, "a,b\n1,2\n3,4").expect("write file");

    let rows = read_all(&TabularExporter::default(), &path);
    assert_eq!(rows.last().unwrap(), &vec!["3", "4"]);
}

#[test]
fn download_writes_raw_http_response() {
    let mut exporter = TabularExporter::new(people(), ["name", "age"]);
    let mut sink = HttpResponseWriter::new(Vec::new());
    exporter.download_as(&mut sink, "people list").expect("download");

    let raw = String::from_utf8(sink.into_inner()).expect("utf8");
    assert_eq!(
        raw,
        "Cache-Control: must-revalidate, post-check=0, pre-check=0\r\n\
         Content-type: text/csv\r\n\
         Content-Disposition: attachment; filename=people-list.csv\r\n\
         Expires: 0\r\n\
         Pragma: public\r\n\
         \r\n\
         name,age\nAnn,30\n\"Bo, Jr.\",25\n"
    );
}

#[test]
fn download_invalid_name_falls_back() {
    let mut exporter = TabularExporter::new(people(), HeaderSet::Derived);
    let mut response = BufferedResponse::new();
    exporter.download_as(&mut response, "////").expect("download");

    assert_eq!(
        response.header("Content-Disposition"),
        Some("attachment; filename=output.csv")
    );
}

#[test]
fn records_from_json() {
    let value = serde_json::json!([
        {"subject": "S001", "visit": 1, "done": true},
        "not a row",
        {"subject": "S002", "visit": 2, "done": null}
    ]);
    let data: Vec<Record> = match value {
        serde_json::Value::Array(items) => items.into_iter().map(Record::from).collect(),
        _ => unreachable!(),
    };

    let mut exporter = TabularExporter::new(data, HeaderSet::Derived);
    exporter.process().expect("process");
    assert_eq!(
        exporter.csv_result(),
        Some("subject,visit,done\nS001,1,true\nS002,2,\n")
    );
}
