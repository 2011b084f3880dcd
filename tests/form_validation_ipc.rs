use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
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

fn spawn_sidecar(locale: &str) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .env_remove("GRADEBOOK_WORKSPACE")
        .env("GRADEBOOK_LOCALE", locale)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
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
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
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
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    assert_eq!(value["ok"], json!(false), "expected failure: {}", value);
    value["error"]["code"].as_str().unwrap_or("")
}

#[test]
fn invalid_forms_are_rejected_without_losing_input() {
    let workspace = temp_dir("gradebook-form-validation");
    let (mut child, mut stdin, mut reader) = spawn_sidecar("id");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let closed = request(
        &mut stdin,
        &mut reader,
        "2",
        "form.save",
        json!({ "name": "Ani", "studentId": "1", "scoreComponent1": "1", "scoreComponent2": "1", "scoreFinalExam": "1" }),
    );
    assert_eq!(error_code(&closed), "form_closed");

    let opened = request_ok(&mut stdin, &mut reader, "3", "form.openAdd", json!({}));
    assert_eq!(opened["mode"], json!("adding"));
    assert_eq!(opened["title"], json!("Tambah Data Mahasiswa"));
    assert_eq!(opened["fields"]["courseName"], json!("Analisa Berorientasi Objek"));
    assert_eq!(opened["fields"]["name"], json!(""));

    let twice = request(&mut stdin, &mut reader, "4", "form.openAdd", json!({}));
    assert_eq!(error_code(&twice), "form_already_open");

    let missing = request(
        &mut stdin,
        &mut reader,
        "5",
        "form.save",
        json!({ "name": "  ", "studentId": "123", "scoreComponent1": "80", "scoreComponent2": "70", "scoreFinalExam": "90" }),
    );
    assert_eq!(error_code(&missing), "missing_field");
    assert_eq!(missing["error"]["message"], json!("Semua field harus diisi!"));
    assert_eq!(missing["error"]["details"]["field"], json!("name"));

    let nan = request(
        &mut stdin,
        &mut reader,
        "6",
        "form.save",
        json!({ "name": "Ani", "scoreComponent1": "abc" }),
    );
    assert_eq!(error_code(&nan), "not_a_number");
    assert_eq!(nan["error"]["message"], json!("Nilai harus berupa angka yang valid!"));
    assert_eq!(nan["error"]["details"]["field"], json!("scoreComponent1"));
    // Everything typed so far is still held by the open form.
    let held = &nan["error"]["details"]["form"];
    assert_eq!(held["mode"], json!("adding"));
    assert_eq!(held["fields"]["name"], json!("Ani"));
    assert_eq!(held["fields"]["studentId"], json!("123"));
    assert_eq!(held["fields"]["scoreComponent1"], json!("abc"));
    assert_eq!(held["fields"]["scoreFinalExam"], json!("90"));

    for (i, bad) in ["101", "-1"].iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("7-{i}"),
            "form.save",
            json!({ "scoreComponent1": bad }),
        );
        assert_eq!(error_code(&resp), "out_of_range");
        assert_eq!(resp["error"]["message"], json!("Nilai harus antara 0-100!"));
    }

    let course = request(
        &mut stdin,
        &mut reader,
        "8",
        "form.save",
        json!({ "scoreComponent1": "80", "courseName": "Astrologi" }),
    );
    assert_eq!(error_code(&course), "unknown_course");

    let listed = request_ok(&mut stdin, &mut reader, "9", "students.list", json!({}));
    assert_eq!(listed["empty"], json!(true));

    let form = request_ok(&mut stdin, &mut reader, "10", "form.get", json!({}));
    assert_eq!(form["mode"], json!("adding"));

    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "form.save",
        json!({ "courseName": "Pemrograman Web" }),
    );
    assert_eq!(saved["students"][0]["name"], json!("Ani"));
    assert_eq!(saved["students"][0]["grade"], json!("A"));

    let cancelled = request_ok(&mut stdin, &mut reader, "12", "form.openAdd", json!({}));
    assert_eq!(cancelled["fields"]["name"], json!(""));
    let closed = request_ok(&mut stdin, &mut reader, "13", "form.cancel", json!({}));
    assert_eq!(closed["mode"], json!("closed"));
    assert_eq!(closed["editingId"], json!(null));

    let ghost = request(&mut stdin, &mut reader, "14", "form.openEdit", json!({ "id": 999 }));
    assert_eq!(error_code(&ghost), "not_found");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn grading_preview_follows_thresholds() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar("en");

    let cases = [
        (80.0, "A"),
        (79.99, "B+"),
        (75.0, "B+"),
        (69.0, "B"),
        (68.99, "C+"),
        (65.0, "C+"),
        (56.0, "C"),
        (55.99, "D"),
    ];
    for (i, (score, grade)) in cases.iter().enumerate() {
        // Equal components make the weighted score equal the input.
        let text = score.to_string();
        let result = request_ok(
            &mut stdin,
            &mut reader,
            &format!("g{i}"),
            "grading.compute",
            json!({
                "scoreComponent1": text,
                "scoreComponent2": text,
                "scoreFinalExam": text
            }),
        );
        let final_score = result["scoreFinal"].as_f64().expect("scoreFinal");
        assert!((final_score - score).abs() < 1e-9, "{score} -> {final_score}");
        assert_eq!(result["grade"], json!(grade), "score {score}");
    }

    let mixed = request_ok(
        &mut stdin,
        &mut reader,
        "m",
        "grading.compute",
        json!({ "scoreComponent1": 80, "scoreComponent2": 70, "scoreFinalExam": 90 }),
    );
    assert_eq!(mixed["scoreFinalText"], json!("81.00"));
    assert_eq!(mixed["gradeColor"], json!("#4CAF50"));

    let bad = request(
        &mut stdin,
        &mut reader,
        "b",
        "grading.compute",
        json!({ "scoreComponent1": "80", "scoreComponent2": "x", "scoreFinalExam": "90" }),
    );
    assert_eq!(error_code(&bad), "not_a_number");
    assert_eq!(bad["error"]["message"], json!("Scores must be valid numbers!"));

    drop(stdin);
    let _ = child.wait();
}
