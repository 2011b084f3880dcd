use crate::ipc::error::{err, no_workspace, ok, store_err};
use crate::ipc::handlers::students::list_json;
use crate::ipc::helpers::{get_id, get_text};
use crate::ipc::types::{AppState, Request};
use crate::messages::{Locale, Message};
use crate::store::{Form, FormFields, FormMode, SaveOutcome};
use crate::validation::Field;
use serde_json::json;

fn form_json(form: &Form, locale: Locale) -> serde_json::Value {
    let (mode, editing_id, title) = match form.mode {
        FormMode::Closed => ("closed", None, None),
        FormMode::Adding => ("adding", None, Some(Message::FormTitleAdd.text(locale))),
        FormMode::Editing { id } => (
            "editing",
            Some(id),
            Some(Message::FormTitleEdit.text(locale)),
        ),
    };
    let f = &form.fields;
    json!({
        "mode": mode,
        "editingId": editing_id,
        "title": title,
        "fields": {
            "name": f.name,
            "studentId": f.student_id,
            "courseName": f.course_name,
            "scoreComponent1": f.score_component1,
            "scoreComponent2": f.score_component2,
            "scoreFinalExam": f.score_final_exam,
        },
    })
}

/// Params present in the request replace the held text; absent ones keep it.
fn merge_fields(held: &FormFields, params: &serde_json::Value) -> FormFields {
    let pick = |field: Field, current: &str| {
        get_text(params, field.key()).unwrap_or_else(|| current.to_string())
    };
    FormFields {
        name: pick(Field::Name, &held.name),
        student_id: pick(Field::StudentId, &held.student_id),
        course_name: pick(Field::CourseName, &held.course_name),
        score_component1: pick(Field::ScoreComponent1, &held.score_component1),
        score_component2: pick(Field::ScoreComponent2, &held.score_component2),
        score_final_exam: pick(Field::ScoreFinalExam, &held.score_final_exam),
    }
}

fn handle_form_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_ref() else {
        return no_workspace(&req.id, locale);
    };
    ok(&req.id, form_json(store.form(), locale))
}

fn handle_form_open_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_mut() else {
        return no_workspace(&req.id, locale);
    };
    match store.open_add() {
        Ok(()) => ok(&req.id, form_json(store.form(), locale)),
        Err(e) => store_err(&req.id, locale, &e, None),
    }
}

fn handle_form_open_edit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_mut() else {
        return no_workspace(&req.id, locale);
    };
    let Some(id) = get_id(&req.params, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    match store.open_edit(id) {
        Ok(()) => ok(&req.id, form_json(store.form(), locale)),
        Err(e) => store_err(&req.id, locale, &e, None),
    }
}

fn handle_form_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_mut() else {
        return no_workspace(&req.id, locale);
    };
    store.cancel();
    ok(&req.id, form_json(store.form(), locale))
}

fn handle_form_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let locale = state.locale;
    let Some(store) = state.store.as_mut() else {
        return no_workspace(&req.id, locale);
    };
    let fields = merge_fields(&store.form().fields, &req.params);
    let outcome = match store.save(fields) {
        Ok(v) => v,
        Err(e) => {
            let mut resp = store_err(&req.id, locale, &e, None);
            resp["error"]["details"]["form"] = form_json(store.form(), locale);
            return resp;
        }
    };
    let form = form_json(store.form(), locale);

    let (student_id, created, message) = match outcome {
        SaveOutcome::Created { id } => (id, true, Message::Created),
        SaveOutcome::Updated { id } => (id, false, Message::Updated),
    };
    let mut result = list_json(state);
    result["savedId"] = json!(student_id);
    result["created"] = json!(created);
    result["message"] = json!(message.text(locale));
    result["form"] = form;
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "form.get" => Some(handle_form_get(state, req)),
        "form.openAdd" => Some(handle_form_open_add(state, req)),
        "form.openEdit" => Some(handle_form_open_edit(state, req)),
        "form.cancel" => Some(handle_form_cancel(state, req)),
        "form.save" => Some(handle_form_save(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_held_text_for_absent_params() {
        let held = FormFields {
            name: "Ani".to_string(),
            ..FormFields::default()
        };
        let merged = merge_fields(&held, &json!({ "scoreComponent1": 80, "studentId": "123" }));
        assert_eq!(merged.name, "Ani");
        assert_eq!(merged.student_id, "123");
        assert_eq!(merged.score_component1, "80");
        assert_eq!(merged.course_name, crate::model::default_course());
        assert_eq!(merged.score_final_exam, "");
    }
}
