mod backup;
mod config;
mod db;
mod grading;
mod ipc;
mod messages;
mod model;
mod store;
mod validation;

use std::io::{self, BufRead, Write};

fn init_tracing() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    init_tracing();
    let cfg = config::Config::from_env();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        locale = cfg.locale.code(),
        "starting gradebookd"
    );

    let mut state = ipc::AppState {
        workspace: None,
        store: None,
        locale: cfg.locale,
    };
    if let Some(path) = cfg.workspace {
        // A failed startup open leaves an empty list; the front end can retry.
        let _ = ipc::open_workspace(&mut state, path);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; answer with a bare error line.
                tracing::warn!(error = %e, "malformed request line");
                let reply = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{reply}");
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    tracing::info!("stdin closed, shutting down");
}
