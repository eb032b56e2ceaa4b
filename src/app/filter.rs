use regex::{Regex, RegexBuilder};

use crate::app::model::{Book, ListQuery};

/// The single filter applied to a listing.
///
/// Only one query parameter is honored per request. `name` wins over
/// `reading`, which wins over `finished`; empty parameters count as absent.
#[derive(Debug, Clone)]
pub enum BookFilter {
    All,
    /// `None` only when the pattern exceeds the regex size limit; matches nothing.
    Name(Option<Regex>),
    /// `None` when the query value does not coerce to a number; matches nothing.
    Reading(Option<f64>),
    Finished(Option<f64>),
}

impl BookFilter {
    pub fn from_query(query: &ListQuery) -> Self {
        if let Some(name) = non_empty(query.name.as_deref()) {
            return Self::Name(name_matcher(name));
        }
        if let Some(reading) = non_empty(query.reading.as_deref()) {
            return Self::Reading(coerce_number(reading));
        }
        if let Some(finished) = non_empty(query.finished.as_deref()) {
            return Self::Finished(coerce_number(finished));
        }
        Self::All
    }

    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Self::All => true,
            Self::Name(re) => re.as_ref().is_some_and(|re| re.is_match(&book.name)),
            Self::Reading(want) => flag_equals(book.reading, *want),
            Self::Finished(want) => flag_equals(book.finished, *want),
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !v.is_empty())
}

/// Case-insensitive pattern. Falls back to a literal match when `pattern` is not a valid regex.
fn name_matcher(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|err| {
            tracing::debug!(pattern, %err, "name query is not a valid pattern; matching literally");
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        _ => trimmed.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn flag_equals(flag: bool, want: Option<f64>) -> bool {
    let have = if flag { 1.0 } else { 0.0 };
    want.is_some_and(|want| want == have)
}
