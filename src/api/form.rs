//! Entity input extraction.
//!
//! Admin writes arrive either as JSON or as flat form fields (`multipart/form-data` or
//! urlencoded). Both end up as the same typed input struct; multipart bodies may also
//! carry an `imageFile` part.

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;
use crate::models::{ArticleInput, PersonInput, ReviewInput, StatsInput};
use crate::upload::ImageFile;

/// Multipart part holding an image to upload with the record.
pub const IMAGE_FILE_FIELD: &str = "imageFile";

/// A typed entity input plus an optional uploaded image.
#[derive(Debug)]
pub struct FormInput<T> {
    pub input: T,
    pub image: Option<ImageFile>,
}

/// Flat text fields submitted by a form. Tracks which fields were consumed so that
/// leftovers can be rejected.
#[derive(Debug, Default)]
pub struct FormFields {
    values: HashMap<String, String>,
    taken: HashSet<String>,
}

impl FormFields {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            taken: HashSet::new(),
        }
    }

    fn take(&mut self, name: &str) -> Option<&str> {
        self.taken.insert(name.to_string());
        self.values.get(name).map(String::as_str)
    }

    /// A required text field; missing reads as empty so validation reports it.
    pub fn text(&mut self, name: &str) -> String {
        self.take(name).unwrap_or_default().to_string()
    }

    pub fn optional(&mut self, name: &str) -> Option<String> {
        self.take(name).map(str::to_string)
    }

    /// An integer field. Blank counts as absent; anything else must parse.
    pub fn integer(&mut self, name: &str) -> Result<Option<i64>, AppError> {
        match self.take(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                AppError::validation(name, format!("{} must be a whole number", name))
            }),
        }
    }

    /// A checkbox-style flag: "true", "on", "1" and "yes" are set.
    pub fn flag(&mut self, name: &str) -> bool {
        matches!(
            self.take(name).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("true" | "on" | "1" | "yes")
        )
    }

    /// Reject any submitted field the input type did not read.
    pub fn finish(self) -> Result<(), AppError> {
        let mut unknown: Vec<&String> = self
            .values
            .keys()
            .filter(|k| !self.taken.contains(k.as_str()))
            .collect();
        unknown.sort();
        match unknown.first() {
            None => Ok(()),
            Some(name) => Err(AppError::BadRequest(format!("Unknown field: {}", name))),
        }
    }
}

/// Construction of an input type from flat form fields.
pub trait FromForm: Sized {
    fn from_form(fields: &mut FormFields) -> Result<Self, AppError>;
}

impl FromForm for ReviewInput {
    fn from_form(fields: &mut FormFields) -> Result<Self, AppError> {
        Ok(Self {
            name: fields.text("name"),
            role: fields.optional("role"),
            school: fields.text("school"),
            content: fields.text("content"),
            rating: fields.integer("rating")?.unwrap_or(0),
            date: fields.optional("date"),
            source: fields.optional("source"),
        })
    }
}

impl FromForm for ArticleInput {
    fn from_form(fields: &mut FormFields) -> Result<Self, AppError> {
        Ok(Self {
            title: fields.text("title"),
            slug: fields.text("slug"),
            excerpt: fields.text("excerpt"),
            content: fields.text("content"),
            author: fields.text("author"),
            date: fields.optional("date"),
            read_time: fields.text("readTime"),
            image: fields.optional("image"),
            published: fields.flag("published"),
            views: fields.integer("views")?,
            comments: fields.integer("comments")?,
        })
    }
}

impl FromForm for PersonInput {
    fn from_form(fields: &mut FormFields) -> Result<Self, AppError> {
        Ok(Self {
            name: fields.text("name"),
            role: fields.text("role"),
            chapter: fields.text("chapter"),
            image: fields.optional("image"),
            description: fields.optional("description"),
            order: fields.integer("order")?,
        })
    }
}

impl FromForm for StatsInput {
    fn from_form(fields: &mut FormFields) -> Result<Self, AppError> {
        Ok(Self {
            schools_visited: fields.integer("schoolsVisited")?,
            classes_taught: fields.integer("classesTaught")?,
            students_inspired: fields.integer("studentsInspired")?,
        })
    }
}

fn parse_fields<T: FromForm>(values: HashMap<String, String>) -> Result<T, AppError> {
    let mut fields = FormFields::new(values);
    let input = T::from_form(&mut fields)?;
    fields.finish()?;
    Ok(input)
}

fn content_type(req: &Request) -> String {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Option<ImageFile>), AppError> {
    let mut values = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Upload(format!("Could not read uploaded file: {}", e)))?;
            // Browsers send an empty part when no file was picked.
            if !file_name.is_empty() && !bytes.is_empty() {
                image = Some(ImageFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Malformed field {}: {}", name, e)))?;
            values.insert(name, text);
        }
    }

    Ok((values, image))
}

impl<S, T> FromRequest<S> for FormInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned + FromForm + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(&req);

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            let (values, image) = read_multipart(multipart).await?;
            return Ok(Self {
                input: parse_fields(values)?,
                image,
            });
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(values) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self {
                input: parse_fields(values)?,
                image: None,
            });
        }

        let Json(input) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self { input, image: None })
    }
}

/// JSON body whose rejection uses the error envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}
