use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

const MAX_DESCRIPTION_LEN: usize = 1000;

/// Body of `POST /api/{user_id}/tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskCreate {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// At most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// New tasks are open unless stated otherwise.
    #[serde(default)]
    pub completed: bool,
}

/// Body of `PUT /api/{user_id}/tasks/{id}`. Omitted fields keep their value.
///
/// `description` distinguishes an absent key (`None`) from an explicit
/// `null` (`Some(None)`), which clears the stored description. An empty
/// string clears it as well.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update_description"))]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,

    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// `Some(new_value)` when the description should be written, where
    /// `new_value` is `None` for a cleared description.
    pub fn description_change(&self) -> Option<Option<&str>> {
        self.description.as_ref().map(|value| {
            value
                .as_deref()
                .filter(|description| !description.is_empty())
        })
    }
}

// Only reached when the key is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn validate_update_description(update: &TaskUpdate) -> Result<(), ValidationError> {
    match update.description_change() {
        Some(Some(description)) if description.chars().count() > MAX_DESCRIPTION_LEN => {
            let mut error = ValidationError::new("length");
            error.message = Some("description must be at most 1000 characters".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

/// Body of `PATCH /api/{user_id}/tasks/{id}/toggle`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskToggle {
    pub completed: bool,
}

/// A task row as stored in the `tasks` table and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Owner of the task.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters accepted by `GET /api/{user_id}/tasks`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    /// Case-insensitive match against title or description.
    pub search: Option<String>,
}

impl TaskQuery {
    /// The `ILIKE` pattern for `search`, with LIKE wildcards in the term escaped.
    /// Blank terms are ignored.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }
}
