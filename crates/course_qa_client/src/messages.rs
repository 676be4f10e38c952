//! JSON wire types for the course Q&A HTTP API.
//!
//! `POST /query` takes a [`QueryRequest`] and answers with a [`QueryResponse`];
//! `GET /courses` answers with [`CourseStats`]. Bodies are decoded into these
//! structs at the boundary so a malformed response fails as a typed error
//! instead of reaching the renderer half-filled.

use serde::{Deserialize, Deserializer, Serialize};

/// Client → server: one user query. `session_id` is `null` until the server
/// has issued one for this conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub session_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            query: query.into(),
            session_id,
        }
    }
}

/// Server → client: the answer to a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub session_id: String,
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<Citation>,
}

/// A structured reference backing part of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub display_text: String,
    pub course_title: String,
    #[serde(default)]
    pub lesson_number: Option<i64>,
    pub content_preview: String,
    #[serde(default)]
    pub lesson_link: Option<String>,
}

impl Citation {
    /// The lesson link, if present and non-empty.
    pub fn link(&self) -> Option<&str> {
        self.lesson_link.as_deref().filter(|l| !l.is_empty())
    }
}

/// Server → client: aggregate course metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStats {
    pub total_courses: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub course_titles: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
