use crate::backup;
use crate::ipc::error::{err, no_workspace, ok, store_err};
use crate::ipc::handlers::core::open_workspace;
use crate::ipc::handlers::students::list_json;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_workspace(&req.id, state.locale);
    };
    let Some(out_path) = req
        .params
        .get("outPath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    else {
        return err(&req.id, "bad_params", "missing outPath", None);
    };

    match backup::export_workspace_bundle(store.gateway(), &out_path) {
        Ok(summary) => {
            tracing::info!(
                out = %out_path.display(),
                students = summary.student_count,
                "workspace bundle exported"
            );
            ok(
                &req.id,
                json!({
                    "outPath": out_path.to_string_lossy(),
                    "bundleFormat": summary.bundle_format,
                    "studentCount": summary.student_count,
                    "dbSha256": summary.db_sha256,
                }),
            )
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "workspace export failed");
            err(&req.id, "backup_export_failed", format!("{e:#}"), None)
        }
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return no_workspace(&req.id, state.locale);
    };
    let Some(in_path) = req
        .params
        .get("inPath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    else {
        return err(&req.id, "bad_params", "missing inPath", None);
    };

    // The live connection must be closed before the file is replaced. A
    // refused import never touches the live file, so reopening restores it.
    state.store = None;
    let imported = backup::import_workspace_bundle(&in_path, &workspace);

    let reopened = open_workspace(state, workspace);
    let summary = match imported {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "workspace import failed");
            return err(&req.id, "backup_import_failed", format!("{e:#}"), None);
        }
    };
    if let Err(e) = reopened {
        return store_err(&req.id, state.locale, &e, None);
    }
    tracing::info!(
        format = summary.bundle_format_detected,
        students = summary.student_count,
        "workspace bundle imported"
    );

    let mut result = list_json(state);
    result["bundleFormatDetected"] = json!(summary.bundle_format_detected);
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(handle_export(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_import(state, req)),
        _ => None,
    }
}
