//! Enrollment workflow.
//!
//! Creation matches course and student by name, never by id: the backend
//! looks the course up by title and the student by first and last name.

use reqwest::Method;
use tracing::instrument;

use crate::error::Result;
use crate::gateway::{Gateway, Payload};
use crate::models::{Enrollment, EnrollmentRequest, EnrollmentStatus, StatusUpdate};

/// Enrollment endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Enrollments<'a> {
    gateway: &'a Gateway,
}

impl<'a> Enrollments<'a> {
    /// Creates a client over `gateway`.
    #[must_use]
    pub const fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// `POST /api/enrollments/enroll` with `{courseName, firstName, lastName}`.
    #[instrument(skip(self))]
    pub async fn enroll(
        &self,
        course_name: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Enrollment> {
        let request = EnrollmentRequest {
            course_name: course_name.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        self.gateway
            .send_json(Method::POST, "/api/enrollments/enroll", &request)
            .await
    }

    /// `GET /api/enrollments`
    pub async fn all(&self) -> Result<Vec<Enrollment>> {
        self.gateway.get("/api/enrollments").await
    }

    /// `GET /api/enrollments/:id`
    pub async fn read(&self, id: u64) -> Result<Enrollment> {
        self.gateway.get(&format!("/api/enrollments/{id}")).await
    }

    /// `PUT /api/enrollments/:id/approve`
    pub async fn approve(&self, id: u64) -> Result<Enrollment> {
        self.transition(id, "approve").await
    }

    /// `PUT /api/enrollments/:id/reject`
    pub async fn reject(&self, id: u64) -> Result<Enrollment> {
        self.transition(id, "reject").await
    }

    /// `PUT /api/enrollments/:id/reset`: back to `PENDING`.
    pub async fn reset(&self, id: u64) -> Result<Enrollment> {
        self.transition(id, "reset").await
    }

    /// `PUT /api/enrollments/:id/status` with body `{status}`.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: u64, status: EnrollmentStatus) -> Result<Enrollment> {
        self.gateway
            .send_json(
                Method::PUT,
                &format!("/api/enrollments/{id}/status"),
                &StatusUpdate { status },
            )
            .await
    }

    /// `GET /api/enrollments/student/:id`
    pub async fn by_student(&self, student_id: u64) -> Result<Vec<Enrollment>> {
        self.gateway
            .get(&format!("/api/enrollments/student/{student_id}"))
            .await
    }

    /// `GET /api/enrollments/course/:id`
    pub async fn by_course(&self, course_id: u64) -> Result<Vec<Enrollment>> {
        self.gateway
            .get(&format!("/api/enrollments/course/{course_id}"))
            .await
    }

    /// `GET /api/enrollments/status/:status`
    pub async fn by_status(&self, status: EnrollmentStatus) -> Result<Vec<Enrollment>> {
        self.gateway
            .get(&format!("/api/enrollments/status/{status}"))
            .await
    }

    #[instrument(skip(self))]
    async fn transition(&self, id: u64, verb: &str) -> Result<Enrollment> {
        self.gateway
            .send(
                Method::PUT,
                &format!("/api/enrollments/{id}/{verb}"),
                Payload::Empty,
            )
            .await
    }
}
