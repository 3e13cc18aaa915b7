//! Contact and career submission intake plus the admin moderation workflow.
//!
//! Records live behind [`RecordStore`]; CV files live in a [`CvStore`] keyed by generated
//! names while the original upload name stays on the record.

pub mod auth;
pub mod cv_store;
pub mod domain;
pub mod moderation;
pub mod router;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use auth::{AdminVerifier, StaticKeyVerifier, ADMIN_KEY_HEADER};
pub use cv_store::{CvStore, CvStoreError, StoredCv};
pub use domain::{
    CareerApplication, ContactSubmission, CvDownload, NewCareerApplication, NewContact, Record,
    RecordId, RecordKind,
};
pub use moderation::ModerationService;
pub use router::{submission_router, SiteState, UPLOAD_BODY_LIMIT};
pub use service::{SubmissionError, SubmissionService};
pub use store::{DocumentStore, RecordStore, StoreError};
pub use validation::{CareerForm, ContactForm, CvUpload, ALLOWED_CV_EXTENSIONS, MAX_CV_BYTES};
