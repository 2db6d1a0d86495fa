//! LMNOP learning-management client
//!
//! Session persistence, an authenticated HTTP gateway, typed resource
//! clients for the LMNOP backend, and role-based page access.

pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod quiz;
pub mod resources;
pub mod session;

pub use config::Config;
pub use context::LmsContext;
pub use error::{LmsError, Result};
pub use gateway::{normalize_error_body, Gateway};
pub use guard::{Access, AccessGuard, Navigation, Page};
pub use models::{
    Account, Course, CourseForm, Credentials, Enrollment, EnrollmentRequest, EnrollmentStatus,
    Identity, ImageFormat, ImageUpload, LoginResponse, Quiz, Role, StatusUpdate, SupportMessage,
};
pub use navigation::{Location, Navigator};
pub use quiz::{grade, QuizResult, QuizSheet, CATALOG};
pub use resources::{AccountFamily, Accounts, Courses, Enrollments, Quizzes, Support};
pub use session::{FileStorage, MemoryStorage, Session, SessionStore, Storage};
