use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tracing::error;

use super::auth::ADMIN_KEY_HEADER;
use super::domain::{CareerApplication, ContactSubmission, CvDownload, RecordId};
use super::moderation::ModerationService;
use super::service::{SubmissionError, SubmissionService};
use super::store::RecordStore;
use super::validation::{CareerForm, ContactForm, CvUpload, MAX_CV_BYTES};

/// Request body ceiling for the multipart career route; a CV between the per-file limit
/// and this size is still read so it can be reported as too large.
pub const UPLOAD_BODY_LIMIT: usize = 2 * MAX_CV_BYTES;

/// Services shared by every submission route.
pub struct SiteState<C, K> {
    pub submissions: Arc<SubmissionService<C, K>>,
    pub moderation: Arc<ModerationService<C, K>>,
}

impl<C, K> Clone for SiteState<C, K> {
    fn clone(&self) -> Self {
        Self {
            submissions: Arc::clone(&self.submissions),
            moderation: Arc::clone(&self.moderation),
        }
    }
}

/// Router builder exposing the public intake and admin moderation endpoints.
pub fn submission_router<C, K>(state: SiteState<C, K>) -> Router
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    Router::new()
        .route("/api/contact/submit", post(submit_contact_handler::<C, K>))
        .route(
            "/api/contact/admin/submissions",
            get(list_contacts_handler::<C, K>),
        )
        .route(
            "/api/contact/admin/submissions/:id/read",
            patch(mark_contact_read_handler::<C, K>),
        )
        .route(
            "/api/contact/admin/submissions/:id",
            delete(delete_contact_handler::<C, K>),
        )
        .route(
            "/api/career/submit",
            post(submit_career_handler::<C, K>).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/career/admin/applications",
            get(list_careers_handler::<C, K>),
        )
        .route(
            "/api/career/admin/applications/:id/read",
            patch(mark_career_read_handler::<C, K>),
        )
        .route(
            "/api/career/admin/applications/:id",
            delete(delete_career_handler::<C, K>),
        )
        .route(
            "/api/career/admin/applications/:id/cv",
            get(career_cv_handler::<C, K>),
        )
        .with_state(state)
}

/// `{success, data?, message?}` body shared by every JSON response.
#[derive(Debug, Serialize)]
struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn success<T: Serialize>(status: StatusCode, data: Option<T>, message: Option<&str>) -> Response {
    let body = Envelope {
        success: true,
        data,
        message: message.map(str::to_string),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let status = match &self {
            SubmissionError::Validation(_)
            | SubmissionError::UnsupportedFileType { .. }
            | SubmissionError::FileTooLarge { .. } => StatusCode::BAD_REQUEST,
            SubmissionError::Unauthorized => StatusCode::UNAUTHORIZED,
            SubmissionError::NotFound(_) | SubmissionError::FileMissing => StatusCode::NOT_FOUND,
            SubmissionError::Store(_) | SubmissionError::CvStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if self.is_client_error() {
            self.to_string()
        } else {
            error!(error = %self, "submission request failed");
            "Internal server error".to_string()
        };

        let body = Envelope::<()> {
            success: false,
            data: None,
            message: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

fn admin_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

pub(crate) async fn submit_contact_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    let Ok(Json(form)) = payload else {
        return SubmissionError::Validation("Invalid request body".to_string()).into_response();
    };

    match state.submissions.submit_contact(form).await {
        Ok(record) => success(
            StatusCode::CREATED,
            Some(record),
            Some("Contact form submitted successfully"),
        ),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn submit_career_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    let Ok(multipart) = multipart else {
        return SubmissionError::Validation("Expected a multipart form body".to_string())
            .into_response();
    };

    let form = match read_career_form(multipart).await {
        Ok(form) => form,
        Err(err) => return err.into_response(),
    };

    match state.submissions.submit_career(form).await {
        Ok(record) => success(
            StatusCode::CREATED,
            Some(record),
            Some("Career application submitted successfully"),
        ),
        Err(err) => err.into_response(),
    }
}

async fn read_career_form(mut multipart: Multipart) -> Result<CareerForm, SubmissionError> {
    let mut form = CareerForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = read_cv_bytes(field).await?;
                form.cv = Some(CvUpload { file_name, bytes });
            }
            "name" => form.name = Some(field.text().await.map_err(multipart_error)?),
            "email" => form.email = Some(field.text().await.map_err(multipart_error)?),
            "skills" => form.skills = Some(field.text().await.map_err(multipart_error)?),
            "experienceYears" => {
                form.experience_years = Some(field.text().await.map_err(multipart_error)?)
            }
            "experienceMonths" => {
                form.experience_months = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Buffer at most one byte past the CV limit; the rest of an oversized part is drained.
async fn read_cv_bytes(mut field: Field<'_>) -> Result<Vec<u8>, SubmissionError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        let room = (MAX_CV_BYTES + 1).saturating_sub(bytes.len());
        bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    Ok(bytes)
}

fn multipart_error(err: MultipartError) -> SubmissionError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SubmissionError::FileTooLarge {
            limit: MAX_CV_BYTES,
        }
    } else {
        SubmissionError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}

pub(crate) async fn list_contacts_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    headers: HeaderMap,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    match state.moderation.list_contacts(admin_key(&headers)).await {
        Ok(records) => success(StatusCode::OK, Some(records), None),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn mark_contact_read_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    match state
        .moderation
        .mark_contact_read(admin_key(&headers), &RecordId(id))
        .await
    {
        Ok(record) => success(StatusCode::OK, Some(record), None),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_contact_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    match state
        .moderation
        .delete_contact(admin_key(&headers), &RecordId(id))
        .await
    {
        Ok(()) => success::<()>(
            StatusCode::OK,
            None,
            Some("Contact submission deleted successfully"),
        ),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_careers_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    headers: HeaderMap,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    match state.moderation.list_careers(admin_key(&headers)).await {
        Ok(records) => success(StatusCode::OK, Some(records), None),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn mark_career_read_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    match state
        .moderation
        .mark_career_read(admin_key(&headers), &RecordId(id))
        .await
    {
        Ok(record) => success(StatusCode::OK, Some(record), None),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_career_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    match state
        .moderation
        .delete_career(admin_key(&headers), &RecordId(id))
        .await
    {
        Ok(()) => success::<()>(
            StatusCode::OK,
            None,
            Some("Career application deleted successfully"),
        ),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn career_cv_handler<C, K>(
    State(state): State<SiteState<C, K>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    match state
        .moderation
        .career_cv(admin_key(&headers), &RecordId(id))
        .await
    {
        Ok(download) => cv_response(download),
        Err(err) => err.into_response(),
    }
}

fn cv_response(download: CvDownload) -> Response {
    let disposition = content_disposition(&download.file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback name plus the RFC 5987 encoded original.
pub(crate) fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    let encoded: String = file_name
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
                char::from(b).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect();

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
