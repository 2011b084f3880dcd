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

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .env_remove("GRADEBOOK_WORKSPACE")
        .env("GRADEBOOK_LOCALE", "id")
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
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

fn count(value: &serde_json::Value) -> usize {
    value
        .get("result")
        .and_then(|r| r.get("students"))
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("gradebook-router-smoke");
    let bundle_out = workspace.join("smoke-backup.gbbackup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(&mut stdin, &mut reader, "1", "health", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request(&mut stdin, &mut reader, "3", "workspace.retry", json!({}));
    let _ = request(&mut stdin, &mut reader, "4", "courses.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "5",
        "grading.compute",
        json!({ "scoreComponent1": 80, "scoreComponent2": 70, "scoreFinalExam": 90 }),
    );
    let _ = request(&mut stdin, &mut reader, "6", "form.get", json!({}));
    let _ = request(&mut stdin, &mut reader, "7", "form.openAdd", json!({}));
    let _ = request(&mut stdin, &mut reader, "8", "form.cancel", json!({}));
    let _ = request(&mut stdin, &mut reader, "9", "form.openAdd", json!({}));
    let saved = request(
        &mut stdin,
        &mut reader,
        "10",
        "form.save",
        json!({
            "name": "Smoke",
            "studentId": "001",
            "courseName": "Machine Learning",
            "scoreComponent1": "90",
            "scoreComponent2": "90",
            "scoreFinalExam": "90"
        }),
    );
    let saved_id = saved
        .get("result")
        .and_then(|v| v.get("savedId"))
        .and_then(|v| v.as_i64())
        .expect("savedId");

    let listed = request(&mut stdin, &mut reader, "11", "students.list", json!({}));
    assert_eq!(count(&listed), 1);

    let exported = request(
        &mut stdin,
        &mut reader,
        "12",
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(exported["ok"], json!(true), "{}", exported);
    assert_eq!(
        exported["result"]["bundleFormat"],
        json!("gradebook-workspace-v1")
    );

    let _ = request(
        &mut stdin,
        &mut reader,
        "13",
        "form.openEdit",
        json!({ "id": saved_id }),
    );
    let _ = request(&mut stdin, &mut reader, "14", "form.cancel", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "15",
        "students.requestDelete",
        json!({ "id": saved_id }),
    );
    let _ = request(&mut stdin, &mut reader, "16", "students.cancelDelete", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "17",
        "students.requestDelete",
        json!({ "id": saved_id }),
    );
    let deleted = request(
        &mut stdin,
        &mut reader,
        "18",
        "students.confirmDelete",
        json!({ "id": saved_id }),
    );
    assert_eq!(count(&deleted), 0);

    // Restoring the bundle brings back the row that existed at export time.
    let imported = request(
        &mut stdin,
        &mut reader,
        "19",
        "backup.importWorkspaceBundle",
        json!({ "inPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(imported["ok"], json!(true), "{}", imported);
    assert_eq!(
        imported["result"]["bundleFormatDetected"],
        json!("gradebook-workspace-v1")
    );
    assert_eq!(count(&imported), 1);
    assert_eq!(imported["result"]["students"][0]["name"], json!("Smoke"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
