use std::sync::Arc;

use tracing::{info, warn};

use super::auth::AdminVerifier;
use super::cv_store::CvStore;
use super::domain::{CareerApplication, ContactSubmission, CvDownload, Record, RecordId};
use super::service::SubmissionError;
use super::store::RecordStore;

/// Admin-facing operations over both collections, gated by an [`AdminVerifier`].
///
/// Every operation checks the presented key before touching a store, so callers without
/// a valid key learn nothing about which ids exist.
pub struct ModerationService<C, K> {
    contacts: Arc<C>,
    careers: Arc<K>,
    cvs: CvStore,
    verifier: Arc<dyn AdminVerifier>,
}

impl<C, K> ModerationService<C, K>
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    pub fn new(
        contacts: Arc<C>,
        careers: Arc<K>,
        cvs: CvStore,
        verifier: Arc<dyn AdminVerifier>,
    ) -> Self {
        Self {
            contacts,
            careers,
            cvs,
            verifier,
        }
    }

    fn authorize(&self, key: Option<&str>) -> Result<(), SubmissionError> {
        match key {
            Some(key) if self.verifier.verify(key) => Ok(()),
            _ => {
                warn!("rejected admin request with missing or invalid key");
                Err(SubmissionError::Unauthorized)
            }
        }
    }

    pub async fn list_contacts(
        &self,
        key: Option<&str>,
    ) -> Result<Vec<ContactSubmission>, SubmissionError> {
        self.authorize(key)?;
        Ok(self.contacts.newest_first().await?)
    }

    pub async fn list_careers(
        &self,
        key: Option<&str>,
    ) -> Result<Vec<CareerApplication>, SubmissionError> {
        self.authorize(key)?;
        Ok(self.careers.newest_first().await?)
    }

    pub async fn mark_contact_read(
        &self,
        key: Option<&str>,
        id: &RecordId,
    ) -> Result<ContactSubmission, SubmissionError> {
        self.authorize(key)?;
        mark_read(self.contacts.as_ref(), id).await
    }

    pub async fn mark_career_read(
        &self,
        key: Option<&str>,
        id: &RecordId,
    ) -> Result<CareerApplication, SubmissionError> {
        self.authorize(key)?;
        mark_read(self.careers.as_ref(), id).await
    }

    pub async fn delete_contact(
        &self,
        key: Option<&str>,
        id: &RecordId,
    ) -> Result<(), SubmissionError> {
        self.authorize(key)?;
        self.contacts
            .remove(id)
            .await?
            .ok_or(SubmissionError::NotFound(ContactSubmission::KIND))?;
        info!(%id, "contact submission deleted");
        Ok(())
    }

    /// Delete an application together with its CV.
    ///
    /// The file goes first and an already missing file is ignored. A crash between the two
    /// steps leaves at worst an orphaned file, never a record whose CV was deleted on purpose.
    pub async fn delete_career(
        &self,
        key: Option<&str>,
        id: &RecordId,
    ) -> Result<(), SubmissionError> {
        self.authorize(key)?;
        let record = self
            .careers
            .find(id)
            .await?
            .ok_or(SubmissionError::NotFound(CareerApplication::KIND))?;

        if !self.cvs.remove(&record.cv_path).await? {
            warn!(%id, cv_path = %record.cv_path, "cv already absent while deleting application");
        }

        self.careers
            .remove(id)
            .await?
            .ok_or(SubmissionError::NotFound(CareerApplication::KIND))?;
        info!(%id, "career application deleted");
        Ok(())
    }

    /// Fetch the stored CV for an application, named as it was uploaded.
    pub async fn career_cv(
        &self,
        key: Option<&str>,
        id: &RecordId,
    ) -> Result<CvDownload, SubmissionError> {
        self.authorize(key)?;
        let record = self
            .careers
            .find(id)
            .await?
            .ok_or(SubmissionError::NotFound(CareerApplication::KIND))?;

        let bytes = self
            .cvs
            .read(&record.cv_path)
            .await?
            .ok_or(SubmissionError::FileMissing)?;

        let content_type = mime_guess::from_path(&record.cv_file_name)
            .first_or(mime::APPLICATION_OCTET_STREAM)
            .to_string();

        Ok(CvDownload {
            file_name: record.cv_file_name,
            content_type,
            bytes,
        })
    }
}

async fn mark_read<T, S>(store: &S, id: &RecordId) -> Result<T, SubmissionError>
where
    T: Record,
    S: RecordStore<T> + ?Sized,
{
    let record = store
        .update(id, &|record: &mut T| record.mark_read())
        .await?
        .ok_or(SubmissionError::NotFound(T::KIND))?;
    info!(%id, collection = T::COLLECTION, "record marked read");
    Ok(record)
}
