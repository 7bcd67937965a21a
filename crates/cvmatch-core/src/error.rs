use thiserror::Error;

use crate::validation::FormField;

const MIB: u64 = 1024 * 1024;

/// Shown for any transport-level failure (DNS, offline, CORS, aborted).
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Shown when the response could not be parsed or rendered.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred during analysis. Please try again.";

/// Why a picked file was refused before it ever reaches the form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileRejection {
    #[error("Please upload a valid file type (PDF, DOC, DOCX, or TXT)")]
    UnsupportedType { extension: String },

    #[error("File size exceeds {}MB limit", .max / MIB)]
    TooLarge { size: u64, max: u64 },
}

/// First failing check of the submission form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter your Google API Key")]
    MissingApiKey,

    #[error("Please upload your CV/Resume")]
    MissingFile,

    #[error("Please enter the job description")]
    MissingJobDescription,

    #[error("Please provide a more detailed job description")]
    JobDescriptionTooShort { chars: usize, min: usize },
}

impl FormError {
    /// Field that should flash after this error, if any
    pub fn highlight(&self) -> Option<FormField> {
        match self {
            FormError::MissingApiKey => Some(FormField::ApiKey),
            FormError::MissingJobDescription => Some(FormField::JobDescription),
            FormError::MissingFile | FormError::JobDescriptionTooShort { .. } => None,
        }
    }
}

/// Failure of a submission after validation passed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    /// The request never produced a response
    #[error("{0}")]
    Network(String),

    /// The endpoint answered with a non-success status
    #[error("HTTP error! status: {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Failed to update results")]
    Render,
}

impl AnalyzeError {
    /// Build a status error, keeping the `error` field of a JSON error body
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
        AnalyzeError::Status { status, detail }
    }

    /// Message for the error banner
    pub fn user_message(&self) -> String {
        match self {
            AnalyzeError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            AnalyzeError::InvalidResponse(_) | AnalyzeError::Render => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            AnalyzeError::Status {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Local storage is not available")]
    Unavailable,

    #[error("Failed to write {key}: {reason}")]
    WriteFailed { key: String, reason: String },
}
