use std::sync::Arc;

use tracing::{error, info};

use super::cv_store::{CvStore, CvStoreError};
use super::domain::{
    CareerApplication, ContactSubmission, NewCareerApplication, RecordKind,
};
use super::store::{RecordStore, StoreError};
use super::validation::{CareerForm, ContactForm};

/// Public intake: records contact messages and career applications.
pub struct SubmissionService<C, K> {
    contacts: Arc<C>,
    careers: Arc<K>,
    cvs: CvStore,
}

impl<C, K> SubmissionService<C, K>
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    pub fn new(contacts: Arc<C>, careers: Arc<K>, cvs: CvStore) -> Self {
        Self {
            contacts,
            careers,
            cvs,
        }
    }

    /// Validate and store a contact message.
    pub async fn submit_contact(
        &self,
        form: ContactForm,
    ) -> Result<ContactSubmission, SubmissionError> {
        let draft = form.validate()?;
        let record = self.contacts.insert(draft).await?;
        info!(id = %record.id, "contact submission received");
        Ok(record)
    }

    /// Validate a career application, store its CV and then the record.
    ///
    /// Nothing is written unless every field passes validation. If the record cannot be
    /// persisted the freshly stored CV is removed again.
    pub async fn submit_career(
        &self,
        form: CareerForm,
    ) -> Result<CareerApplication, SubmissionError> {
        let valid = form.validate()?;
        let stored = self.cvs.put(&valid.cv_extension, &valid.cv_bytes).await?;

        let draft = NewCareerApplication {
            name: valid.name,
            email: valid.email,
            skills: valid.skills,
            experience_years: valid.experience_years,
            experience_months: valid.experience_months,
            cv_file_name: valid.cv_file_name,
            cv_path: stored.path.clone(),
        };

        match self.careers.insert(draft).await {
            Ok(record) => {
                info!(id = %record.id, cv = %stored.key, "career application received");
                Ok(record)
            }
            Err(err) => {
                if let Err(cleanup) = self.cvs.remove(&stored.path).await {
                    error!(error = %cleanup, cv = %stored.key, "failed to discard orphaned cv");
                }
                Err(err.into())
            }
        }
    }
}

/// Error raised by the submission and moderation services.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),
    #[error("Only PDF, DOC, and DOCX files are allowed")]
    UnsupportedFileType { extension: String },
    #[error("CV file must not exceed {} MB", .limit / (1024 * 1024))]
    FileTooLarge { limit: usize },
    #[error("Unauthorized access")]
    Unauthorized,
    #[error("{} not found", .0.label())]
    NotFound(RecordKind),
    #[error("CV file not found")]
    FileMissing,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    CvStore(#[from] CvStoreError),
}

impl SubmissionError {
    /// Whether the error is a caller mistake rather than a fault on our side.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SubmissionError::Store(_) | SubmissionError::CvStore(_))
    }
}
