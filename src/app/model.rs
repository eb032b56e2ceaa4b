use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
    pub finished: bool,

    #[serde(serialize_with = "serialize_iso_millis")]
    pub inserted_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn to_summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }

    /// Overwrites every mutable field from `input` and recomputes `finished`.
    /// `id` and `inserted_at` are left alone.
    pub(crate) fn apply(&mut self, input: BookInput, name: String, now: DateTime<Utc>) {
        self.name = name;
        self.year = input.year;
        self.author = input.author;
        self.summary = input.summary;
        self.publisher = input.publisher;
        self.page_count = input.page_count;
        self.read_page = input.read_page;
        self.reading = input.reading;
        self.finished = input.page_count == input.read_page;
        self.updated_at = now;
    }
}

/// Payload accepted by add and update. Unknown keys (including `finished`) are ignored.
/// Absent or `null` fields other than `name` take their type default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookInput {
    pub name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub year: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publisher: String,
    #[serde(deserialize_with = "null_as_default")]
    pub page_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub read_page: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub reading: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub name: Option<String>,
    pub reading: Option<String>,
    pub finished: Option<String>,
}

impl ListQuery {
    /// Builds the query from raw `key=value` pairs. A repeated key keeps its
    /// first non-empty value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut query.name,
                "reading" => &mut query.reading,
                "finished" => &mut query.finished,
                _ => continue,
            };
            if slot.as_deref().is_none_or(str::is_empty) {
                *slot = Some(value);
            }
        }
        query
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// Same shape as JavaScript's `Date.prototype.toISOString`: `2024-01-02T03:04:05.678Z`.
fn serialize_iso_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
