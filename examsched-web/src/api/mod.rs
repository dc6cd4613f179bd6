//! HTTP handlers for examsched-web

pub mod health;
pub mod process;
pub mod select;
pub mod ui;

pub use health::health_routes;
pub use process::process_selection;
pub use select::{echo_selection, select_form};

/// Form field carrying the chosen subjects (repeated once per checkbox)
pub const SELECTED_FIELD: &str = "selected_subjects";

/// Values of every `selected_subjects` pair, in submission order
pub fn selected_values(form: Vec<(String, String)>) -> Vec<String> {
    form.into_iter()
        .filter(|(key, _)| key == SELECTED_FIELD)
        .map(|(_, value)| value)
        .collect()
}
