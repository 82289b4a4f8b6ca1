//! Custom extractors for Axum handlers.

pub mod json_or_form;

pub use json_or_form::{JsonOrForm, JsonOrFormRejection};
