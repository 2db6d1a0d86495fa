//! Quizzes stored by the backend.

use reqwest::Method;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::models::Quiz;

/// Quiz endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Quizzes<'a> {
    gateway: &'a Gateway,
}

impl<'a> Quizzes<'a> {
    /// Creates a client over `gateway`.
    #[must_use]
    pub const fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// `POST /quizzes/create`
    pub async fn create(&self, quiz: &Quiz) -> Result<Quiz> {
        self.gateway
            .send_json(Method::POST, "/quizzes/create", quiz)
            .await
    }

    /// `GET /quizzes/all`
    pub async fn all(&self) -> Result<Vec<Quiz>> {
        self.gateway.get("/quizzes/all").await
    }

    /// `GET /quizzes/read/:id`
    pub async fn read(&self, id: u64) -> Result<Quiz> {
        self.gateway.get(&format!("/quizzes/read/{id}")).await
    }

    /// `PUT /quizzes/update`
    pub async fn update(&self, quiz: &Quiz) -> Result<Quiz> {
        self.gateway
            .send_json(Method::PUT, "/quizzes/update", quiz)
            .await
    }

    /// `DELETE /quizzes/delete/:id`
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.gateway
            .send_discarding(Method::DELETE, &format!("/quizzes/delete/{id}"))
            .await
    }
}
