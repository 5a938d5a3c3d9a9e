//! Rendering of lists inside of denial messages: `[1000, 0, 100]` for IDs,
//! `['course1', 'course2']` for names. Log processing tools match on this
//! exact shape.

use itertools::Itertools;

pub(crate) fn render_ids(ids: &[i64]) -> String {
    format!("[{}]", ids.iter().join(", "))
}

pub(crate) fn render_names<S: AsRef<str>>(names: &[S]) -> String {
    format!(
        "[{}]",
        names
            .iter()
            .map(|name| format!("'{}'", name.as_ref()))
            .join(", ")
    )
}
