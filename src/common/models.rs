//! # Domain Models
//!
//! Entities exchanged with the course backend. All of them are owned by the
//! backend; the client only observes or constructs them.
//!
//! JSON uses camelCase keys and `YYYY-MM-DD` dates:
//! ```text
//! {"id":1,"name":"CSE316","termStart":"2024-01-01","termEnd":"2024-05-01","mainExamDate":null}
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tracked course as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Server-assigned identifier
    pub id: i64,
    pub name: String,
    pub term_start: NaiveDate,
    pub term_end: NaiveDate,
    #[serde(default)]
    pub main_exam_date: Option<NaiveDate>,
}

impl Course {
    /// Combine a submitted course with the id the backend assigned to it.
    pub fn from_new(id: i64, course: NewCourse) -> Self {
        Self {
            id,
            name: course.name,
            term_start: course.term_start,
            term_end: course.term_end,
            main_exam_date: course.main_exam_date,
        }
    }
}

/// Body of `POST /courses`.
///
/// `mainExamDate` is always present and serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub name: String,
    pub term_start: NaiveDate,
    pub term_end: NaiveDate,
    pub main_exam_date: Option<NaiveDate>,
}

impl NewCourse {
    /// The backend expects `termStart <= termEnd` but nothing enforces it.
    pub fn has_ordered_term(&self) -> bool {
        self.term_start <= self.term_end
    }
}

/// Creation acknowledgement. Accepts a full course or a bare `{ "id": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Created {
    pub id: i64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
