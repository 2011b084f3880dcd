use crate::db::format_timestamp;
use crate::grading::format_final_score;
use crate::ipc::error::{err, no_workspace, ok, store_err};
use crate::ipc::helpers::get_id;
use crate::ipc::types::{AppState, Request};
use crate::messages::Message;
use crate::model::{self, StudentRecord};
use serde_json::json;

pub(crate) fn student_json(r: &StudentRecord) -> serde_json::Value {
    json!({
        "id": r.id,
        "name": r.name,
        "studentId": r.student_id,
        "courseName": r.course_name,
        "scoreComponent1": r.scores.component1,
        "scoreComponent2": r.scores.component2,
        "scoreFinalExam": r.scores.final_exam,
        "scoreFinal": r.score_final,
        "scoreFinalText": format_final_score(r.score_final),
        "grade": r.grade.label(),
        "gradeColor": r.grade.color(),
        "createdAt": format_timestamp(&r.created_at),
    })
}

/// Current list as the front end renders it, newest first.
pub(crate) fn list_json(state: &AppState) -> serde_json::Value {
    let store = state.store.as_ref();
    let students: Vec<serde_json::Value> = store
        .map(|s| s.records().iter().map(student_json).collect())
        .unwrap_or_default();
    let mut result = json!({
        "students": students,
        "empty": students.is_empty(),
        "pendingDeleteId": store.and_then(|s| s.pending_delete()),
    });
    if students.is_empty() {
        result["emptyState"] = json!({
            "title": Message::EmptyList.text(state.locale),
            "hint": Message::EmptyListHint.text(state.locale),
        });
    }
    result
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, list_json(state))
}

fn handle_courses_list(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "courses": model::COURSE_NAMES,
            "default": model::default_course(),
        }),
    )
}

fn handle_request_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_mut() else {
        return no_workspace(&req.id, locale);
    };
    let Some(id) = get_id(&req.params, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    match store.request_delete(id) {
        Ok(()) => ok(
            &req.id,
            json!({
                "pendingDeleteId": id,
                "confirmPrompt": Message::ConfirmDelete.text(locale),
            }),
        ),
        Err(e) => store_err(&req.id, locale, &e, None),
    }
}

fn handle_confirm_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_mut() else {
        return no_workspace(&req.id, locale);
    };
    let Some(id) = get_id(&req.params, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    if let Err(e) = store.confirm_delete(id) {
        return store_err(&req.id, locale, &e, Some(Message::DeleteFailed));
    }
    let mut result = list_json(state);
    result["deletedId"] = json!(id);
    result["message"] = json!(Message::Deleted.text(locale));
    ok(&req.id, result)
}

fn handle_cancel_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_mut() else {
        return no_workspace(&req.id, locale);
    };
    store.cancel_delete();
    ok(&req.id, json!({ "pendingDeleteId": null }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "courses.list" => Some(handle_courses_list(state, req)),
        "students.requestDelete" => Some(handle_request_delete(state, req)),
        "students.confirmDelete" => Some(handle_confirm_delete(state, req)),
        "students.cancelDelete" => Some(handle_cancel_delete(state, req)),
        _ => None,
    }
}
