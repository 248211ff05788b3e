use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{CourseId, ResourceId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResourceError {
    #[error("file name cannot be empty")]
    EmptyFileName,

    #[error("file url cannot be empty")]
    EmptyFileUrl,
}

/// A downloadable file attached to a course. Lifecycle is admin-owned:
/// created and deleted through the backend, read-only for learners.
///
/// `file_size` is a display label ("2.4 MB"), not a byte count — the backend
/// stores whatever the admin typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    id: ResourceId,
    course_id: CourseId,
    file_name: String,
    file_size: String,
    file_url: String,
    created_at: DateTime<Utc>,
}

impl Resource {
    /// Creates a resource record.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError` if the file name or URL is blank.
    pub fn new(
        id: ResourceId,
        course_id: CourseId,
        file_name: impl Into<String>,
        file_size: impl Into<String>,
        file_url: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ResourceError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(ResourceError::EmptyFileName);
        }
        let file_url = file_url.into();
        if file_url.trim().is_empty() {
            return Err(ResourceError::EmptyFileUrl);
        }

        Ok(Self {
            id,
            course_id,
            file_name: file_name.trim().to_owned(),
            file_size: file_size.into(),
            file_url: file_url.trim().to_owned(),
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn file_size(&self) -> &str {
        &self.file_size
    }

    #[must_use]
    pub fn file_url(&self) -> &str {
        &self.file_url
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn resource_rejects_blank_name() {
        let err = Resource::new(
            ResourceId::random(),
            CourseId::random(),
            " ",
            "1 MB",
            "https://cdn.example.com/a.pdf",
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ResourceError::EmptyFileName);
    }

    #[test]
    fn resource_trims_name_and_url() {
        let res = Resource::new(
            ResourceId::random(),
            CourseId::random(),
            " slides.pdf ",
            "2.4 MB",
            " https://cdn.example.com/slides.pdf ",
            fixed_now(),
        )
        .unwrap();
        assert_eq!(res.file_name(), "slides.pdf");
        assert_eq!(res.file_url(), "https://cdn.example.com/slides.pdf");
        assert_eq!(res.file_size(), "2.4 MB");
    }
}
