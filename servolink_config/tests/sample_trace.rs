use std::fs::File;
use std::io::Write;

use rstest::rstest;
use servolink_config::{SampleRow, load_sample_trace};
use tempfile::tempdir;

fn write_csv(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("trace.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[rstest]
fn loads_rows_in_file_order() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "channel,raw\n0,512\n1, 87\n0,600\n");
    let rows = load_sample_trace(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            SampleRow { channel: 0, raw: 512 },
            SampleRow { channel: 1, raw: 87 },
            SampleRow { channel: 0, raw: 600 },
        ]
    );
}

#[rstest]
#[case("raw,channel\n512,0\n")]
#[case("chan,raw\n0,512\n")]
#[case("channel,raw,extra\n0,512,1\n")]
fn rejects_wrong_headers(#[case] body: &str) {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, body);
    let err = load_sample_trace(&path).expect_err("bad headers");
    assert!(
        format!("{err}")
            .to_lowercase()
            .contains("must have headers 'channel,raw'")
    );
}

#[rstest]
fn reports_bad_row_with_line_number() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "channel,raw\n0,512\n300,1\n");
    let err = load_sample_trace(&path).expect_err("channel out of u8 range");
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[rstest]
fn rejects_empty_trace() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "channel,raw\n");
    let err = load_sample_trace(&path).expect_err("empty");
    assert!(format!("{err}").contains("no rows"));
}

#[rstest]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_sample_trace(&dir.path().join("nope.csv")).expect_err("missing");
    assert!(format!("{err}").contains("open sample trace"));
}
