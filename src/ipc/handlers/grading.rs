use crate::grading::format_final_score;
use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::get_text;
use crate::ipc::types::{AppState, Request};
use crate::store::StoreError;
use crate::validation::{self, Field};
use serde_json::json;

/// Live preview of the final score and grade; nothing is stored.
fn handle_grading_compute(state: &mut AppState, req: &Request) -> serde_json::Value {
    let text = |field: Field| get_text(&req.params, field.key()).unwrap_or_default();
    let scores = match validation::validate_scores(
        &text(Field::ScoreComponent1),
        &text(Field::ScoreComponent2),
        &text(Field::ScoreFinalExam),
    ) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, state.locale, &StoreError::from(e), None),
    };
    let final_score = scores.final_score();
    let grade = scores.grade();
    ok(
        &req.id,
        json!({
            "scoreFinal": final_score,
            "scoreFinalText": format_final_score(final_score),
            "grade": grade.label(),
            "gradeColor": grade.color(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grading.compute" => Some(handle_grading_compute(state, req)),
        _ => None,
    }
}
