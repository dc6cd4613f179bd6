//! Selection processing
//!
//! POST /process runs the full pipeline for one submission: reload the
//! schedule sheet, rebuild the schedule, resolve the selected subjects.

use axum::{extract::State, response::Html, Form};
use examsched_common::config::Config;
use examsched_common::sources::load_schedule;
use examsched_common::Resolution;
use tracing::{debug, info};

use super::{selected_values, ui};
use crate::error::ApiResult;
use crate::AppState;

/// POST /process
///
/// Form field `selected_subjects`, repeated once per chosen subject.
pub async fn process_selection(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>,
) -> ApiResult<Html<String>> {
    let selected = selected_values(form);
    info!("Processing {} selected subjects", selected.len());

    let config = state.config.clone();
    let resolution =
        tokio::task::spawn_blocking(move || run_pipeline(&config, &selected)).await??;

    info!("Resolved {} exam sittings", resolution.records.len());
    Ok(Html(ui::schedule_page(&state.config.sources.sheet, &resolution)))
}

/// Load the schedule from disk and resolve `selected` against it
pub fn run_pipeline(config: &Config, selected: &[String]) -> ApiResult<Resolution> {
    let schedule = load_schedule(&config.sources.schedule_path, &config.layout)?;
    debug!(
        "Schedule {} loaded: {} rows, {} subjects",
        config.sources.schedule_path.display(),
        schedule.rows().len(),
        schedule.subjects().len()
    );

    Ok(config.resolver().resolve(selected, &schedule)?)
}
