//! Interactive terminal list for todopad.

mod app;
mod form;
mod view;

pub use app::{run, AppState};
pub use form::{DraftForm, FormAction, FormField, FormKind};
