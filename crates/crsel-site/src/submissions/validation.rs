use std::path::Path;

use serde::Deserialize;

use super::domain::NewContact;
use super::service::SubmissionError;

/// Largest CV accepted, in bytes.
pub const MAX_CV_BYTES: usize = 5 * 1024 * 1024;

/// Extensions accepted for CV uploads, compared case-insensitively.
pub const ALLOWED_CV_EXTENSIONS: [&str; 3] = [".pdf", ".doc", ".docx"];

const CONTACT_FIELDS_REQUIRED: &str = "All fields are required";
const CAREER_FIELDS_REQUIRED: &str = "All fields including CV are required";

/// Contact form as received; every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    pub(crate) fn validate(self) -> Result<NewContact, SubmissionError> {
        let missing = || SubmissionError::Validation(CONTACT_FIELDS_REQUIRED.to_string());
        Ok(NewContact {
            name: required(self.name).ok_or_else(missing)?,
            email: normalize_email(self.email).ok_or_else(missing)?,
            message: required(self.message).ok_or_else(missing)?,
        })
    }
}

/// Uploaded CV part of a career form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Career form as received from the multipart body; numeric fields arrive as text.
#[derive(Debug, Clone, Default)]
pub struct CareerForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub skills: Option<String>,
    pub experience_years: Option<String>,
    pub experience_months: Option<String>,
    pub cv: Option<CvUpload>,
}

/// Career form fields after validation, with the CV still in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidCareerForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) skills: String,
    pub(crate) experience_years: u32,
    pub(crate) experience_months: u8,
    pub(crate) cv_file_name: String,
    pub(crate) cv_extension: String,
    pub(crate) cv_bytes: Vec<u8>,
}

impl CareerForm {
    pub(crate) fn validate(self) -> Result<ValidCareerForm, SubmissionError> {
        let missing = || SubmissionError::Validation(CAREER_FIELDS_REQUIRED.to_string());

        let name = required(self.name).ok_or_else(missing)?;
        let email = normalize_email(self.email).ok_or_else(missing)?;
        let skills = required(self.skills).ok_or_else(missing)?;
        let years = required(self.experience_years).ok_or_else(missing)?;
        let months = required(self.experience_months).ok_or_else(missing)?;
        let cv = self
            .cv
            .filter(|cv| !cv.file_name.trim().is_empty())
            .ok_or_else(missing)?;

        let experience_years = years.parse::<u32>().map_err(|_| {
            SubmissionError::Validation(
                "Experience years must be a whole number of zero or more".to_string(),
            )
        })?;
        let experience_months = months
            .parse::<u8>()
            .ok()
            .filter(|months| *months <= 11)
            .ok_or_else(|| {
                SubmissionError::Validation(
                    "Experience months must be a whole number between 0 and 11".to_string(),
                )
            })?;

        let cv_extension = cv_extension(&cv.file_name)?;
        if cv.bytes.len() > MAX_CV_BYTES {
            return Err(SubmissionError::FileTooLarge {
                limit: MAX_CV_BYTES,
            });
        }

        Ok(ValidCareerForm {
            name,
            email,
            skills,
            experience_years,
            experience_months,
            cv_file_name: cv.file_name,
            cv_extension,
            cv_bytes: cv.bytes,
        })
    }
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn normalize_email(value: Option<String>) -> Option<String> {
    required(value).map(|email| email.to_lowercase())
}

/// Lower-cased extension of an uploaded file name, including the leading dot.
pub(crate) fn cv_extension(file_name: &str) -> Result<String, SubmissionError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    if ALLOWED_CV_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(SubmissionError::UnsupportedFileType { extension })
    }
}
