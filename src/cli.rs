//! Command-line interface of the `client` binary.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::client::courses::CourseForm;
use crate::common::models::Course;

/// Track academic courses against the Study Coach backend.
///
/// The backend URL is read from `STUDY_COACH_API_URL`, falling back to the
/// configuration file and then to `/api` on the configured origin.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the client configuration file (TOML format)
    ///
    /// Example: config/client.toml
    #[arg(short, long)]
    pub config: Option<String>,

    /// Session file holding the stored credential (overrides the config file)
    #[arg(long)]
    pub session_file: Option<String>,

    /// Path to write request metrics JSON output (optional)
    #[arg(long)]
    pub metrics_output: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List tracked courses
    List,

    /// Add a course, then print the refreshed list
    Add {
        /// Course name, e.g. "CSE 316 - Software Development"
        #[arg(long)]
        name: String,

        /// First day of the term (YYYY-MM-DD)
        #[arg(long)]
        term_start: NaiveDate,

        /// Last day of the term (YYYY-MM-DD)
        #[arg(long)]
        term_end: NaiveDate,

        /// Main exam date (YYYY-MM-DD)
        #[arg(long)]
        exam: Option<NaiveDate>,
    },

    /// Store a bearer token obtained from the login flow
    Login {
        #[arg(long)]
        token: String,

        /// Opaque user profile to keep alongside the token
        #[arg(long)]
        user: Option<String>,
    },

    /// Forget the stored credential
    Logout,

    /// Check that the backend is reachable
    Health,
}

impl Command {
    /// Form input for `add`; `None` for every other command.
    pub fn course_form(&self) -> Option<CourseForm> {
        match self {
            Command::Add {
                name,
                term_start,
                term_end,
                exam,
            } => Some(CourseForm {
                name: name.clone(),
                term_start: Some(*term_start),
                term_end: Some(*term_end),
                main_exam_date: *exam,
            }),
            _ => None,
        }
    }
}

/// One line per course: `name (start → end)`, plus the exam date if set.
pub fn render_course(course: &Course) -> String {
    let mut line = format!(
        "{} ({} → {})",
        course.name, course.term_start, course.term_end
    );
    if let Some(exam) = course.main_exam_date {
        line.push_str(&format!("  Exam: {}", exam));
    }
    line
}

pub fn render_courses(courses: &[Course]) -> String {
    if courses.is_empty() {
        return "No courses yet. Add one with `client add` to get started.".to_string();
    }

    let mut out = format!("Your courses ({} total)\n", courses.len());
    for course in courses {
        out.push_str("  ");
        out.push_str(&render_course(course));
        out.push('\n');
    }
    out
}
