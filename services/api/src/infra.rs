use crsel_site::config::AppConfig;
use crsel_site::error::AppError;
use crsel_site::submissions::{
    CareerApplication, ContactSubmission, CvStore, DocumentStore, ModerationService, SiteState,
    StaticKeyVerifier, SubmissionService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type ContactStore = DocumentStore<ContactSubmission>;
pub(crate) type CareerStore = DocumentStore<CareerApplication>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the on-disk collections and upload directory and wire both services over them.
pub(crate) async fn open_site(
    config: &AppConfig,
) -> Result<SiteState<ContactStore, CareerStore>, AppError> {
    let contacts = Arc::new(ContactStore::open(&config.storage.data_dir).await?);
    let careers = Arc::new(CareerStore::open(&config.storage.data_dir).await?);
    let cvs = CvStore::open(&config.storage.upload_dir).await?;
    let verifier = Arc::new(StaticKeyVerifier::new(config.admin.key.clone()));

    Ok(SiteState {
        submissions: Arc::new(SubmissionService::new(
            contacts.clone(),
            careers.clone(),
            cvs.clone(),
        )),
        moderation: Arc::new(ModerationService::new(contacts, careers, cvs, verifier)),
    })
}
