use crate::db::Gateway;
use crate::ipc::error::{err, no_workspace, ok, store_err};
use crate::ipc::handlers::students::list_json;
use crate::ipc::types::{AppState, Request};
use crate::store::{RecordStore, StoreError};
use serde_json::json;
use std::path::PathBuf;

/// Opens `path` as the active workspace. The workspace stays selected even if
/// opening or loading fails so `workspace.retry` can try again.
pub(crate) fn open_workspace(state: &mut AppState, path: PathBuf) -> Result<(), StoreError> {
    state.store = None;
    state.workspace = Some(path.clone());

    let gateway = match Gateway::open(&path) {
        Ok(g) => g,
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %format!("{e:#}"),
                "failed to open workspace"
            );
            return Err(StoreError::WorkspaceOpen(e));
        }
    };
    tracing::info!(path = %path.display(), "workspace opened");

    let mut store = RecordStore::new(gateway);
    let loaded = store.initialize();
    state.store = Some(store);
    loaded
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "locale": state.locale.code(),
            "ready": state.store.is_some(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, path.clone()) {
        Ok(()) => {
            let mut result = list_json(state);
            result["workspacePath"] = json!(path.to_string_lossy());
            ok(&req.id, result)
        }
        Err(e) => store_err(&req.id, state.locale, &e, None),
    }
}

fn handle_workspace_retry(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let result = if let Some(store) = state.store.as_mut() {
        store.initialize()
    } else if let Some(path) = state.workspace.clone() {
        open_workspace(state, path)
    } else {
        return no_workspace(&req.id, locale);
    };
    match result {
        Ok(()) => ok(&req.id, list_json(state)),
        Err(e) => store_err(&req.id, locale, &e, None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "workspace.retry" => Some(handle_workspace_retry(state, req)),
        _ => None,
    }
}
