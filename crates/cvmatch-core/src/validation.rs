//! Submission form validation

use crate::config::FormRules;
use crate::error::FormError;
use crate::file_check::SelectedFile;

/// Form inputs that can be highlighted after a failed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    ApiKey,
    JobDescription,
}

/// Read-only view of the form at the moment of submission
#[derive(Debug, Clone, Copy)]
pub struct FormSnapshot<'a> {
    pub api_key: &'a str,
    pub file: Option<&'a SelectedFile>,
    pub job_description: &'a str,
}

/// Check the form in order: API key, file, job description, description length
///
/// Stops at the first failure so only one error is ever reported.
pub fn validate_form(form: &FormSnapshot<'_>, rules: &FormRules) -> Result<(), FormError> {
    if form.api_key.trim().is_empty() {
        return Err(FormError::MissingApiKey);
    }

    if form.file.is_none() {
        return Err(FormError::MissingFile);
    }

    let description = form.job_description.trim();
    if description.is_empty() {
        return Err(FormError::MissingJobDescription);
    }

    let chars = description.chars().count();
    if chars < rules.min_job_description_chars {
        return Err(FormError::JobDescriptionTooShort {
            chars,
            min: rules.min_job_description_chars,
        });
    }

    Ok(())
}
