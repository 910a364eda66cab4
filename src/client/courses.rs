//! # Courses Page
//!
//! The page-level flow on top of the gateway: load the course list, validate
//! the "add a course" form, create the course, then reload the list.
//!
//! Unlike a fire-and-forget UI callback, every failure is returned to the
//! caller as a [`PageError`] so it can be shown to the user.

use chrono::NaiveDate;
use log::{info, warn};
use thiserror::Error;

use super::client::ApiClient;
use super::error::{FailureKind, GatewayError};
use crate::common::models::{Course, Created, NewCourse};

/// Collection path of the course resource.
pub const COURSES_PATH: &str = "/courses";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("invalid course: {0}")]
    Invalid(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Raw input of the "add a course" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseForm {
    pub name: String,
    pub term_start: Option<NaiveDate>,
    pub term_end: Option<NaiveDate>,
    pub main_exam_date: Option<NaiveDate>,
}

impl CourseForm {
    /// Name and both term dates are required; the exam date is optional.
    pub fn validate(&self) -> Result<NewCourse, PageError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PageError::Invalid("course name is required".to_string()));
        }
        let term_start = self
            .term_start
            .ok_or_else(|| PageError::Invalid("term start date is required".to_string()))?;
        let term_end = self
            .term_end
            .ok_or_else(|| PageError::Invalid("term end date is required".to_string()))?;

        let course = NewCourse {
            name: name.to_string(),
            term_start,
            term_end,
            main_exam_date: self.main_exam_date,
        };

        if !course.has_ordered_term() {
            warn!(
                "Course '{}' ends ({}) before it starts ({})",
                course.name, course.term_end, course.term_start
            );
        }

        Ok(course)
    }
}

/// List all courses.
pub async fn list_courses(api: &ApiClient) -> Result<Vec<Course>, GatewayError> {
    api.list(COURSES_PATH).await
}

/// Create a course and return it with its server-assigned id.
pub async fn create_course(api: &ApiClient, course: NewCourse) -> Result<Course, GatewayError> {
    let created: Created = api.create(COURSES_PATH, &course).await?;
    info!("✅ Created course '{}' (id {})", course.name, created.id);
    Ok(Course::from_new(created.id, course))
}

/// Message suitable for showing to the user.
pub fn describe_failure(err: &PageError) -> String {
    let err = match err {
        PageError::Invalid(reason) => return format!("Please fix the form: {}", reason),
        PageError::Gateway(err) => err,
    };

    match err.kind() {
        FailureKind::HttpStatus if err.is_unauthorized() => {
            "Your session has expired. Please log in again.".to_string()
        }
        FailureKind::HttpStatus => format!("The server rejected the request ({}).", err),
        FailureKind::Network => "Could not reach the server. Is the backend running?".to_string(),
        FailureKind::Timeout => "The server took too long to respond.".to_string(),
        FailureKind::Parse => "The server sent a response we could not read.".to_string(),
        FailureKind::Interceptor | FailureKind::Request => {
            format!("The request could not be sent: {}", err)
        }
    }
}

/// State of the courses page.
pub struct CoursesPage {
    api: ApiClient,
    courses: Vec<Course>,
    loaded: bool,
}

impl CoursesPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            courses: Vec::new(),
            loaded: false,
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// False until the first successful load.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetch the course list. The previous list is kept on failure.
    pub async fn load(&mut self) -> Result<&[Course], PageError> {
        self.courses = list_courses(&self.api).await?;
        self.loaded = true;
        Ok(&self.courses)
    }

    /// Validate `form`, create the course and reload the list.
    ///
    /// An invalid form issues no request.
    pub async fn add(&mut self, form: &CourseForm) -> Result<Course, PageError> {
        let course = form.validate()?;
        let created = create_course(&self.api, course).await?;
        self.load().await?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Option<NaiveDate> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_form_requires_name_and_term() {
        let mut form = CourseForm {
            name: "   ".to_string(),
            term_start: date("2024-01-01"),
            term_end: date("2024-05-01"),
            main_exam_date: None,
        };
        assert!(matches!(form.validate(), Err(PageError::Invalid(_))));

        form.name = " CSE316 ".to_string();
        let course = form.validate().unwrap();
        assert_eq!(course.name, "CSE316");

        form.term_end = None;
        assert!(matches!(form.validate(), Err(PageError::Invalid(_))));
    }

    #[test]
    fn test_inverted_term_is_allowed() {
        let form = CourseForm {
            name: "CSE320".to_string(),
            term_start: date("2024-05-01"),
            term_end: date("2024-01-01"),
            main_exam_date: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_describe_failure() {
        let expired = PageError::Gateway(GatewayError::Http {
            status: 401,
            body: None,
        });
        assert!(describe_failure(&expired).contains("log in"));

        let offline = PageError::Gateway(GatewayError::Network {
            url: "http://localhost:5000/api/courses".to_string(),
            message: "connection refused".to_string(),
        });
        assert!(describe_failure(&offline).contains("reach the server"));

        let invalid = PageError::Invalid("course name is required".to_string());
        assert!(describe_failure(&invalid).contains("course name is required"));
    }
}
