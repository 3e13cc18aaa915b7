use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier assigned by the store when a record is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which collection a record belongs to, used in not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Contact,
    Career,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Contact => "Contact submission",
            RecordKind::Career => "Career application",
        }
    }
}

/// Behavior every stored document shares so a single store implementation serves both
/// collections.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Validated payload the store turns into a record by assigning identity and timestamp.
    type Draft: Send;

    const COLLECTION: &'static str;
    const KIND: RecordKind;

    fn create(id: RecordId, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;
    fn id(&self) -> &RecordId;
    fn created_at(&self) -> DateTime<Utc>;
    fn is_read(&self) -> bool;
    fn mark_read(&mut self);
}

/// Message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Normalized contact form ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Record for ContactSubmission {
    type Draft = NewContact;

    const COLLECTION: &'static str = "contacts";
    const KIND: RecordKind = RecordKind::Contact;

    fn create(id: RecordId, created_at: DateTime<Utc>, draft: NewContact) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            message: draft.message,
            created_at,
            is_read: false,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_read(&self) -> bool {
        self.is_read
    }

    fn mark_read(&mut self) {
        self.is_read = true;
    }
}

/// Job application with an attached CV held in the CV store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerApplication {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub skills: String,
    pub experience_years: u32,
    pub experience_months: u8,
    /// Name of the file as uploaded, offered back on download.
    pub cv_file_name: String,
    /// Location of the stored copy under a generated name.
    pub cv_path: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCareerApplication {
    pub name: String,
    pub email: String,
    pub skills: String,
    pub experience_years: u32,
    pub experience_months: u8,
    pub cv_file_name: String,
    pub cv_path: String,
}

impl Record for CareerApplication {
    type Draft = NewCareerApplication;

    const COLLECTION: &'static str = "career_applications";
    const KIND: RecordKind = RecordKind::Career;

    fn create(id: RecordId, created_at: DateTime<Utc>, draft: NewCareerApplication) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            skills: draft.skills,
            experience_years: draft.experience_years,
            experience_months: draft.experience_months,
            cv_file_name: draft.cv_file_name,
            cv_path: draft.cv_path,
            created_at,
            is_read: false,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_read(&self) -> bool {
        self.is_read
    }

    fn mark_read(&mut self) {
        self.is_read = true;
    }
}

/// CV contents handed back to an admin together with the name to save it under.
///
/// The file is read into memory whole instead of streamed. Uploads are capped at
/// [`MAX_CV_BYTES`](super::validation::MAX_CV_BYTES), so a download never buffers more than that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
