//! Subject selection form
//!
//! GET / lists the subjects from the subject file; POST / echoes the raw
//! selection back without resolving it.

use axum::{extract::State, response::Html, Form};
use examsched_common::matcher::best_match;
use examsched_common::sources::load_subjects;
use tracing::info;

use super::{selected_values, ui};
use crate::error::ApiResult;
use crate::AppState;

/// GET /
///
/// Each listed subject is first matched against the whole list, so the
/// checkbox values are names the list itself agrees on.
pub async fn select_form(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let path = state.config.sources.subjects_path.clone();

    let subjects = tokio::task::spawn_blocking(move || -> ApiResult<Vec<String>> {
        let subjects = load_subjects(&path)?;
        Ok(self_matched(&subjects))
    })
    .await??;

    info!("Serving selection form with {} subjects", subjects.len());
    Ok(Html(ui::select_page(&state.config.sources.sheet, &subjects)))
}

/// POST /
pub async fn echo_selection(Form(form): Form<Vec<(String, String)>>) -> Html<String> {
    let selected = selected_values(form);
    info!("Echoing {} selected subjects", selected.len());
    Html(ui::echo_page(&selected))
}

/// Replace every subject by its best match within the same list
fn self_matched(subjects: &[String]) -> Vec<String> {
    subjects
        .iter()
        .filter_map(|s| best_match(s, subjects).ok())
        .map(|m| m.candidate.to_string())
        .collect()
}
