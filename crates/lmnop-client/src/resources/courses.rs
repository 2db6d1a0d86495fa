//! Course catalogue.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::instrument;

use crate::error::{LmsError, Result};
use crate::gateway::{Gateway, Payload};
use crate::models::{Course, CourseForm};

/// Course endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Courses<'a> {
    gateway: &'a Gateway,
}

impl<'a> Courses<'a> {
    /// Creates a client over `gateway`.
    #[must_use]
    pub const fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// `POST /courses/create` as `multipart/form-data`.
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create(&self, form: &CourseForm) -> Result<Course> {
        self.gateway
            .send(Method::POST, "/courses/create", Payload::Multipart(multipart(form)?))
            .await
    }

    /// `GET /courses/all`
    pub async fn all(&self) -> Result<Vec<Course>> {
        self.gateway.get("/courses/all").await
    }

    /// `GET /courses/:id`
    pub async fn read(&self, id: u64) -> Result<Course> {
        self.gateway.get(&format!("/courses/{id}")).await
    }

    /// `PUT /courses/update` as `multipart/form-data`.
    #[instrument(skip(self, form), fields(id = ?form.id))]
    pub async fn update(&self, form: &CourseForm) -> Result<Course> {
        self.gateway
            .send(Method::PUT, "/courses/update", Payload::Multipart(multipart(form)?))
            .await
    }

    /// `DELETE /courses/delete/:id`
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.gateway
            .send_discarding(Method::DELETE, &format!("/courses/delete/{id}"))
            .await
    }

    /// Address of a course's image, for direct embedding.
    ///
    /// Pure string building; no request is made.
    #[must_use]
    pub fn image_url(&self, id: u64) -> String {
        self.gateway.endpoint(&format!("/courses/media/{id}"))
    }
}

/// Encodes a course form with fields `id` (update only), `title`,
/// `description` and the `image` file part.
fn multipart(form: &CourseForm) -> Result<Form> {
    let mut body = Form::new();
    if let Some(id) = form.id {
        body = body.text("id", id.to_string());
    }
    body = body
        .text("title", form.title.clone())
        .text("description", form.description.clone());

    if let Some(image) = &form.image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.format.mime())
            .map_err(|e| LmsError::invalid_upload(&image.file_name, e.to_string()))?;
        body = body.part("image", part);
    }
    Ok(body)
}
