use calamine::{open_workbook, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_simagamad");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn simagamad");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().expect("result")
}

fn error_code(resp: &serde_json::Value) -> &str {
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
}

fn setup(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, workspace: &Path) {
    let _ = request_ok(
        stdin,
        reader,
        "setup-ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        stdin,
        reader,
        "setup-login",
        "session.login",
        json!({ "user": "admin", "pass": "admin123" }),
    );
}

fn write_student_workbook(path: &Path, rows: &[(&str, &str)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Nama").expect("header a");
    sheet.write_string(0, 1, "Kelas").expect("header b");
    for (i, (name, class)) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, *name).expect("cell a");
        sheet.write_string(r, 1, *class).expect("cell b");
    }
    workbook.save(path).expect("save fixture workbook");
}

#[test]
fn bulk_import_appends_valid_rows_and_skips_blank_ones() {
    let workspace = temp_dir("simagama-import");
    let fixture = workspace.join("siswa.xlsx");
    write_student_workbook(
        &fixture,
        &[("Budi", "7A"), ("", "7B"), ("Siti", ""), ("Andi", "7B")],
    );

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    setup(&mut stdin, &mut reader, &workspace);

    // Import appends to existing students, not replaces.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "name": "Existing", "class": "8A" }),
    );
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.importSheet",
        json!({ "path": fixture.to_string_lossy() }),
    );
    assert_eq!(result.get("imported").and_then(|v| v.as_u64()), Some(2));

    let result = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let names: Vec<&str> = result
        .get("students")
        .and_then(|v| v.as_array())
        .expect("students")
        .iter()
        .map(|s| s.get("name").and_then(|v| v.as_str()).expect("name"))
        .collect();
    assert_eq!(names, ["Existing", "Budi", "Andi"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn import_failures_leave_state_untouched() {
    let workspace = temp_dir("simagama-import-err");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    setup(&mut stdin, &mut reader, &workspace);

    // Not a workbook at all.
    let junk = workspace.join("junk.xlsx");
    std::fs::write(&junk, "definitely not a zip").expect("write junk");
    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "students.importSheet",
        json!({ "path": junk.to_string_lossy() }),
    );
    assert_eq!(error_code(&resp), "sheet_read_failed");

    // Header only: nothing importable.
    let empty = workspace.join("empty.xlsx");
    write_student_workbook(&empty, &[]);
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.importSheet",
        json!({ "path": empty.to_string_lossy() }),
    );
    assert_eq!(error_code(&resp), "no_valid_rows");

    let result = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(
        result.get("students").and_then(|v| v.as_array()).expect("students").len(),
        0
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn report_export_writes_the_filtered_rows() {
    let workspace = temp_dir("simagama-report-export");
    let out = workspace.join("laporan.xlsx");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    setup(&mut stdin, &mut reader, &workspace);

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "name": "Budi", "class": "7A" }),
    );
    let student_id = created
        .pointer("/student/id")
        .and_then(|v| v.as_str())
        .expect("student id")
        .to_string();
    for (i, date) in ["2024-01-10", "2024-02-10"].iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("t{}", i),
            "transactions.create",
            json!({
                "date": date,
                "time": "07:00",
                "studentId": student_id,
                "program": "Sholat Dhuha",
                "reason": "Sakit"
            }),
        );
    }

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.exportSheet",
        json!({ "month": "2024-01", "outPath": out.to_string_lossy() }),
    );
    assert_eq!(result.get("rows").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        result.get("fileName").and_then(|v| v.as_str()),
        Some("Laporan_Absensi_2024-01.xlsx")
    );

    let mut workbook: Xlsx<_> = open_workbook(&out).expect("open exported workbook");
    let range = workbook
        .worksheet_range("Laporan")
        .expect("Laporan sheet");
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Tanggal");
    assert_eq!(rows[1], ["2024-01-10", "07:00", "Budi", "7A", "Sholat Dhuha", "Sakit"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn schedule_export_requires_data_and_writes_all_columns() {
    let workspace = temp_dir("simagama-schedule-export");
    let out = workspace.join("jadwal.xlsx");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    setup(&mut stdin, &mut reader, &workspace);

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "schedules.exportSheet",
        json!({ "outPath": out.to_string_lossy() }),
    );
    assert_eq!(error_code(&resp), "no_data");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "schedules.create",
        json!({
            "activity": "Pembiasaan Baca Al-Quran (35 Menit)",
            "day": "Selasa",
            "week": "Setiap Minggu",
            "month": "Setiap Bulan",
            "year": "2024",
            "class": "7A",
            "notes": "bawa juz amma"
        }),
    );
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "schedules.exportSheet",
        json!({ "outPath": out.to_string_lossy() }),
    );
    assert_eq!(result.get("rows").and_then(|v| v.as_u64()), Some(1));

    let mut workbook: Xlsx<_> = open_workbook(&out).expect("open exported workbook");
    let range = workbook
        .worksheet_range("Jadwal Kegiatan")
        .expect("Jadwal Kegiatan sheet");
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        ["Kegiatan", "Hari", "Minggu Ke", "Bulan", "Tahun", "Kelas", "Keterangan"]
    );
    assert_eq!(
        rows[1],
        [
            "Pembiasaan Baca Al-Quran (35 Menit)",
            "Selasa",
            "Setiap Minggu",
            "Setiap Bulan",
            "2024",
            "7A",
            "bawa juz amma"
        ]
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
