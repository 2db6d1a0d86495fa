//! Text rendering, form checks and user-facing error messages.

use lmnop_client::quiz::{QuizResult, QuizSheet};
use lmnop_client::{
    Access, Account, Course, Enrollment, EnrollmentStatus, Identity, LmsError, Page, Quiz,
    SupportMessage,
};
use regex::Regex;

/// Shown when the backend could not be reached.
pub const NO_RESPONSE: &str = "No response from server. Please check your connection.";

/// Shown after the backend rejected the stored credential.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Shown when the stored identity lacks the student's names.
pub const MISSING_IDENTITY: &str = "User information not found. Please log in again.";

/// Course descriptions on the admin dashboard are cut to this many characters.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const MIN_PASSWORD_CHARS: usize = 6;

// ============================================================================
// Errors
// ============================================================================

/// Translates a client error into the message shown to the user.
///
/// Backend rejections show the backend's own text, or `fallback` when it
/// sent none.
pub fn user_message(err: &LmsError, fallback: &str) -> String {
    match err {
        LmsError::NetworkUnavailable { .. } => NO_RESPONSE.to_string(),
        LmsError::AuthExpired { .. } => SESSION_EXPIRED.to_string(),
        LmsError::ServerRejected { body, .. } if !body.trim().is_empty() => body.clone(),
        LmsError::ServerRejected { .. } => fallback.to_string(),
        other => format!("{fallback}: {other}"),
    }
}

/// Like [`user_message`], for sign-in and sign-up forms.
///
/// There is no session to expire there, so a 401 carries the backend's
/// reason (bad credentials) and is shown as such.
pub fn signed_out_message(err: &LmsError, fallback: &str) -> String {
    match err {
        LmsError::AuthExpired { body } if !body.trim().is_empty() => body.clone(),
        LmsError::AuthExpired { .. } => fallback.to_string(),
        other => user_message(other, fallback),
    }
}

/// Explains why the guard refused `page`.
pub fn access_denied(access: Access, page: Page, redirect: &str) -> String {
    match access {
        Access::Unauthenticated => {
            format!("You must log in to view {page}. Run `lmnop login` first.")
        }
        Access::AuthenticatedWrongRole => {
            format!("Your role may not view {page}. Redirected to {redirect}.")
        }
        Access::AlreadyAuthenticated => {
            "You are already logged in. Run `lmnop logout` first.".to_string()
        }
        Access::Authorized => format!("Redirected to {redirect}."),
    }
}

// ============================================================================
// Forms
// ============================================================================

/// Checks an account form before it is sent.
///
/// Names and email are required and the email must look like one. A
/// password of at least six characters is required when creating, and
/// checked when updating only if one was given.
pub fn validate_account(account: &Account, creating: bool) -> Result<(), &'static str> {
    if account.first_name.trim().is_empty()
        || account.last_name.trim().is_empty()
        || account.email.trim().is_empty()
    {
        return Err("Please fill all required fields");
    }

    if !is_email(&account.email) {
        return Err("Please enter a valid email address");
    }

    let password = account.password.as_deref().unwrap_or_default();
    if (creating || !password.is_empty()) && password.chars().count() < MIN_PASSWORD_CHARS {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

fn is_email(text: &str) -> bool {
    let Ok(re) = Regex::new(EMAIL_PATTERN) else {
        return false;
    };
    re.is_match(text)
}

// ============================================================================
// Dashboards
// ============================================================================

/// Figures shown on the student dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSummary {
    /// Courses in the catalogue.
    pub total_courses: usize,
    /// Approved enrollments.
    pub approved: usize,
    /// Enrollments awaiting a decision.
    pub pending: usize,
    /// Every enrollment that was not rejected.
    pub enrollments: Vec<Enrollment>,
}

impl StudentSummary {
    /// Summarizes the catalogue and the student's enrollments.
    pub fn new(courses: &[Course], enrollments: Vec<Enrollment>) -> Self {
        let enrollments: Vec<Enrollment> = enrollments
            .into_iter()
            .filter(|e| e.status != EnrollmentStatus::Rejected)
            .collect();
        let count = |status: EnrollmentStatus| enrollments.iter().filter(|e| e.status == status).count();
        Self {
            total_courses: courses.len(),
            approved: count(EnrollmentStatus::Approved),
            pending: count(EnrollmentStatus::Pending),
            enrollments,
        }
    }
}

/// Renders the student dashboard.
pub fn student_dashboard(identity: &Identity, summary: &StudentSummary) -> String {
    let mut lines = vec![
        "Student Dashboard".to_string(),
        format!("Welcome, {}", identity.full_name()),
        String::new(),
        format!("  Total courses:        {}", summary.total_courses),
        format!("  Approved enrollments: {}", summary.approved),
        format!("  Pending enrollments:  {}", summary.pending),
        String::new(),
        "Your enrollments:".to_string(),
    ];
    if summary.enrollments.is_empty() {
        lines.push("  (none yet: run `lmnop enroll <course>`)".to_string());
    }
    lines.extend(summary.enrollments.iter().map(enrollment_line));
    lines.join("\n")
}

/// Renders the admin dashboard. Pending enrollments are marked actionable.
pub fn admin_dashboard(enrollments: &[Enrollment], courses: &[Course]) -> String {
    let pending = enrollments.iter().filter(|e| e.is_pending()).count();
    let mut lines = vec![
        "Admin Dashboard".to_string(),
        String::new(),
        format!("Enrollments ({} total, {pending} awaiting a decision):", enrollments.len()),
    ];
    for enrollment in enrollments {
        let mut line = enrollment_line(enrollment);
        if enrollment.is_pending() {
            line.push_str("  [approve/reject]");
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!("Courses ({}):", courses.len()));
    for course in courses {
        lines.push(format!("  #{} {}", course.id, course.title));
        lines.push(format!(
            "      {}",
            truncate(&course.description, DESCRIPTION_PREVIEW_CHARS)
        ));
    }
    lines.join("\n")
}

/// Cuts `text` to `limit` characters, appending `...` when anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

// ============================================================================
// Records
// ============================================================================

/// One line per enrollment.
pub fn enrollment_line(enrollment: &Enrollment) -> String {
    let date = enrollment
        .enrollment_date
        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    format!(
        "  #{:<5} {:<9} {:<30} {} ({date})",
        enrollment.id,
        enrollment.status.as_str(),
        enrollment.course_title,
        enrollment.student_name(),
    )
}

/// One line per course.
pub fn course_line(course: &Course) -> String {
    format!("  #{:<5} {}", course.id, course.title)
}

/// Full course view. `image_url` is shown only when the course has an image.
pub fn course_detail(course: &Course, image_url: &str) -> String {
    let mut lines = vec![
        format!("Course #{}", course.id),
        format!("  Title:       {}", course.title),
        format!("  Description: {}", course.description),
    ];
    if course.has_image() {
        lines.push(format!("  Image:       {image_url}"));
    }
    lines.join("\n")
}

/// One line per account.
pub fn account_line(account: &Account) -> String {
    let id = account
        .id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "  #{id:<5} {} {} <{}>",
        account.first_name, account.last_name, account.email
    )
}

/// The logged-in identity.
pub fn identity(identity: &Identity) -> String {
    format!(
        "{} <{}> ({})",
        identity.full_name(),
        identity.email,
        identity.role
    )
}

/// One line per stored quiz.
pub fn quiz_line(quiz: &Quiz) -> String {
    let id = quiz.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "  #{id:<5} {} ({} questions)",
        quiz.title.as_deref().unwrap_or("(untitled)"),
        quiz.questions.len()
    )
}

/// Per-question outcomes followed by the score.
///
/// Each question lists its choices and what the student picked.
pub fn quiz_result(title: &str, sheet: &QuizSheet, result: &QuizResult) -> String {
    let mut lines = vec![title.to_string(), String::new()];
    for (n, (question, outcome)) in sheet.questions.iter().zip(&result.outcomes).enumerate() {
        lines.push(format!("{}. {}", n + 1, outcome.question));
        lines.push(format!("   Choices: {}", question.choices().join(" / ")));
        lines.push(format!(
            "   Your answer: {}",
            outcome.given.as_deref().unwrap_or("(none)")
        ));
        if outcome.correct {
            lines.push("   Correct".to_string());
        } else {
            lines.push(format!("   Incorrect (Answer: {})", outcome.expected));
        }
    }
    lines.push(String::new());
    lines.push(format!("Your Score: {} / {}", result.score, result.total));
    lines.join("\n")
}

/// One support message.
pub fn support_message(message: &SupportMessage) -> String {
    let id = message
        .id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "  #{id:<5} {} <{}>: {}",
        message.name.as_deref().unwrap_or("anonymous"),
        message.email.as_deref().unwrap_or("-"),
        message.message.as_deref().unwrap_or_default()
    )
}
