use std::path::Path;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;

use crate::submissions::auth::StaticKeyVerifier;
use crate::submissions::cv_store::CvStore;
use crate::submissions::domain::{CareerApplication, ContactSubmission, Record, RecordId};
use crate::submissions::moderation::ModerationService;
use crate::submissions::router::{submission_router, SiteState};
use crate::submissions::service::SubmissionService;
use crate::submissions::store::{DocumentStore, RecordStore, StoreError};
use crate::submissions::validation::{CareerForm, ContactForm, CvUpload};

pub(super) const ADMIN_KEY: &str = "test-admin-key";
pub(super) const WRONG_KEY: &str = "guess";

pub(super) type Contacts = DocumentStore<ContactSubmission>;
pub(super) type Careers = DocumentStore<CareerApplication>;

pub(super) struct Harness {
    pub(super) _dir: TempDir,
    pub(super) contacts: Arc<Contacts>,
    pub(super) careers: Arc<Careers>,
    pub(super) cvs: CvStore,
    pub(super) submissions: Arc<SubmissionService<Contacts, Careers>>,
    pub(super) moderation: Arc<ModerationService<Contacts, Careers>>,
}

impl Harness {
    pub(super) fn upload_dir(&self) -> &Path {
        self.cvs.root()
    }

    pub(super) fn router(&self) -> axum::Router {
        submission_router(SiteState {
            submissions: self.submissions.clone(),
            moderation: self.moderation.clone(),
        })
    }
}

pub(super) async fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let contacts = Arc::new(Contacts::in_memory());
    let careers = Arc::new(Careers::in_memory());
    let cvs = CvStore::open(dir.path().join("uploads/cv"))
        .await
        .expect("upload dir");

    let submissions = Arc::new(SubmissionService::new(
        contacts.clone(),
        careers.clone(),
        cvs.clone(),
    ));
    let moderation = Arc::new(ModerationService::new(
        contacts.clone(),
        careers.clone(),
        cvs.clone(),
        Arc::new(StaticKeyVerifier::new(ADMIN_KEY)),
    ));

    Harness {
        _dir: dir,
        contacts,
        careers,
        cvs,
        submissions,
        moderation,
    }
}

pub(super) fn contact_form() -> ContactForm {
    ContactForm::new("A", "a@b.com", "hi")
}

pub(super) fn career_form(file_name: &str, bytes: Vec<u8>) -> CareerForm {
    CareerForm {
        name: Some("Riya Sen".to_string()),
        email: Some("Riya@Example.com".to_string()),
        skills: Some("Rust, Postgres".to_string()),
        experience_years: Some("3".to_string()),
        experience_months: Some("6".to_string()),
        cv: Some(CvUpload {
            file_name: file_name.to_string(),
            bytes,
        }),
    }
}

pub(super) fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.7\n%resume\n".to_vec()
}

pub(super) fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read upload dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

pub(super) fn missing_id() -> RecordId {
    RecordId::from("00000000-0000-0000-0000-000000000000")
}

/// Store whose backend is always down.
pub(super) struct UnavailableStore;

impl<T: Record> RecordStore<T> for UnavailableStore {
    async fn insert(&self, _draft: T::Draft) -> Result<T, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn find(&self, _id: &RecordId) -> Result<Option<T>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn newest_first(&self) -> Result<Vec<T>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn update(
        &self,
        _id: &RecordId,
        _change: &(dyn Fn(&mut T) + Sync),
    ) -> Result<Option<T>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn remove(&self, _id: &RecordId) -> Result<Option<T>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
