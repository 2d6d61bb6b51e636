//! Text forms of a [`NormalizedValue`].
//!
//! - `render_for_display`: indented JSON, for the inspect view.
//! - `render_inline`: the same JSON on one line, for previews.
//! - `render_for_edit`: labelled fields, for the line-oriented edit form.
//!
//! All of them are pure and deterministic.

use super::error::StoreError;
use super::types::{EditField, NormalizedValue};

pub fn render_for_display(value: &NormalizedValue) -> String {
    format!("{:#}", value.to_json())
}

pub fn render_inline(value: &NormalizedValue) -> String {
    value.to_json().to_string()
}

/// Field pairs for editing. Sequences have no field form and are rejected.
pub fn render_for_edit(value: &NormalizedValue) -> Result<Vec<EditField>, StoreError> {
    match value {
        NormalizedValue::Scalar(text) => Ok(vec![EditField::new("", text.clone())]),
        NormalizedValue::Mapping(fields) => Ok(fields
            .iter()
            .map(|(label, text)| EditField::new(label.clone(), text.clone()))
            .collect()),
        NormalizedValue::Sequence(_) => Err(StoreError::UnsupportedEdit {
            shape: value.shape(),
        }),
    }
}

/// The edit form joined into lines: `label: text`, or bare `text` for an empty label.
pub fn render_edit_text(value: &NormalizedValue) -> Result<String, StoreError> {
    let lines: Vec<String> = render_for_edit(value)?
        .into_iter()
        .map(|field| {
            if field.label.is_empty() {
                field.text
            } else {
                format!("{}: {}", field.label, field.text)
            }
        })
        .collect();
    Ok(lines.join("\n"))
}
