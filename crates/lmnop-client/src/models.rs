//! Wire types exchanged with the LMNOP backend.
//!
//! Field names follow the backend's camelCase JSON. Roles and enrollment
//! statuses travel as upper-case strings.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{LmsError, Result};

// ============================================================================
// Role and Identity
// ============================================================================

/// Role attached to an identity at login time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// A student.
    User,
    /// An administrator.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

/// The authenticated user's profile plus role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Backend identifier, when the login response carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Role chosen by the login portal.
    pub role: Role,
}

impl Identity {
    /// `first last`, for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// Login form body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Creates new credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer credential for later calls.
    pub token: String,
    /// Backend identifier of the account.
    #[serde(default)]
    pub id: Option<u64>,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
}

impl LoginResponse {
    /// Builds the identity to persist, stamping the role of the portal used.
    #[must_use]
    pub fn identity(&self, role: Role) -> Identity {
        Identity {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role,
        }
    }
}

/// A customer or admin account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Backend identifier; absent on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Password; only sent when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ============================================================================
// Courses
// ============================================================================

/// A course as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Backend identifier.
    pub id: u64,
    /// Course title; enrollment requests refer to courses by this.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Encoded image payload, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Course {
    /// Returns `true` if the backend holds an image for this course.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|image| !image.is_empty())
    }
}

/// Image formats the backend accepts for course pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image format.
    Png,
    /// JPEG image format.
    Jpeg,
}

impl ImageFormat {
    /// Detects the format from a file extension, case-insensitively.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Detects the format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME type sent with the multipart file part.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// An image file ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name reported to the backend.
    pub file_name: String,
    /// Detected format.
    pub format: ImageFormat,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Wraps in-memory image bytes.
    #[must_use]
    pub fn new(file_name: impl Into<String>, format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            format,
            bytes,
        }
    }

    /// Reads an image from disk.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::InvalidUpload` if the extension is not JPEG/PNG or
    /// the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path).ok_or_else(|| {
            LmsError::invalid_upload(path, "only JPEG and PNG files are supported")
        })?;
        let bytes = std::fs::read(path)
            .map_err(|e| LmsError::invalid_upload(path, format!("cannot read file: {e}")))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or_else(|| "image".to_string(), ToString::to_string);
        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }
}

/// Multipart payload for course create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseForm {
    /// Course being updated; `None` on create.
    pub id: Option<u64>,
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// New image; on update `None` keeps the current one.
    pub image: Option<ImageUpload>,
}

impl CourseForm {
    /// Form for a new course.
    #[must_use]
    pub fn create(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            image: None,
        }
    }

    /// Form updating an existing course.
    #[must_use]
    pub fn update(id: u64, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::create(title, description)
        }
    }

    /// Attaches an image.
    #[must_use]
    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }
}

// ============================================================================
// Enrollments
// ============================================================================

/// Status of an enrollment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Accepted by an admin.
    Approved,
    /// Refused by an admin.
    Rejected,
}

impl EnrollmentStatus {
    /// Upper-case wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(format!(
                "invalid enrollment status '{s}': expected one of 'PENDING', 'APPROVED', 'REJECTED'"
            )),
        }
    }
}

/// An enrollment as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Backend identifier.
    pub id: u64,
    /// Title of the course applied for.
    pub course_title: String,
    /// Student's given name.
    pub student_first_name: String,
    /// Student's family name.
    pub student_last_name: String,
    /// Current status.
    pub status: EnrollmentStatus,
    /// When the request was made.
    #[serde(default, with = "enrollment_date")]
    pub enrollment_date: Option<NaiveDateTime>,
}

impl Enrollment {
    /// `first last` of the student.
    #[must_use]
    pub fn student_name(&self) -> String {
        format!("{} {}", self.student_first_name, self.student_last_name)
    }

    /// Returns `true` while an admin may still approve or reject.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == EnrollmentStatus::Pending
    }
}

/// Enrollment creation body: course and student are matched by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    /// Course title.
    pub course_name: String,
    /// Student's given name.
    pub first_name: String,
    /// Student's family name.
    pub last_name: String,
}

/// Body of `PUT /api/enrollments/:id/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Target status.
    pub status: EnrollmentStatus,
}

/// The backend's date format varies; accept RFC 3339, zone-less timestamps
/// and bare dates. Any other shape reads as no date, so one odd row does not
/// sink a whole listing.
mod enrollment_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let parsed = match &raw {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::String(text) => parse(text),
            _ => None,
        };
        if parsed.is_none() {
            warn!(date = %raw, "Unrecognized enrollment date, leaving it unset");
        }
        Ok(parsed)
    }
}

// ============================================================================
// Quizzes and Support
// ============================================================================

/// A quiz stored by the backend.
///
/// Fields this client does not model are kept in `extra` and sent back
/// unchanged on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Quiz title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Questions, in the backend's own shape.
    #[serde(default)]
    pub questions: Vec<serde_json::Value>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A support message.
///
/// Unknown fields are preserved like [`Quiz::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportMessage {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Sender's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sender's email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
