pub mod account;
pub mod admin;
pub mod dashboard;
pub mod health;
pub mod reservation;

use serde::Serialize;

/// Describes an HTML-less form: where to submit it and which fields it takes.
#[derive(Serialize)]
pub struct FormDescriptor {
    pub action: String,
    pub method: &'static str,
    pub fields: &'static [&'static str],
}

impl FormDescriptor {
    pub fn post(action: impl Into<String>, fields: &'static [&'static str]) -> Self {
        Self {
            action: action.into(),
            method: "POST",
            fields,
        }
    }
}
