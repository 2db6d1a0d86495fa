//! Support messages.

use reqwest::Method;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::models::SupportMessage;

/// Support endpoints. Note the backend mounts them directly under `/api`.
#[derive(Debug, Clone, Copy)]
pub struct Support<'a> {
    gateway: &'a Gateway,
}

impl<'a> Support<'a> {
    /// Creates a client over `gateway`.
    #[must_use]
    pub const fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// `POST /api/contact-support`
    pub async fn contact(&self, message: &SupportMessage) -> Result<SupportMessage> {
        self.gateway
            .send_json(Method::POST, "/api/contact-support", message)
            .await
    }

    /// `GET /api/allSupportMessages`
    pub async fn all(&self) -> Result<Vec<SupportMessage>> {
        self.gateway.get("/api/allSupportMessages").await
    }

    /// `GET /api/read/:id`
    pub async fn read(&self, id: u64) -> Result<SupportMessage> {
        self.gateway.get(&format!("/api/read/{id}")).await
    }

    /// `POST /api/update`
    pub async fn update(&self, message: &SupportMessage) -> Result<SupportMessage> {
        self.gateway
            .send_json(Method::POST, "/api/update", message)
            .await
    }
}
