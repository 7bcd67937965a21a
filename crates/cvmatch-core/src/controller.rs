//! Form controller
//!
//! Owns the submission workflow and talks to the page only through
//! [`FormView`], to the network only through [`AnalyzeTransport`] and to the
//! clock only through [`Sleep`]. The browser build plugs in `web-sys`
//! implementations; tests plug in recording fakes.
//!
//! ## Submission cycle
//!
//! idle → validating → submitting → rendered | failed → idle
//!
//! A trigger that arrives while a submission is in flight is ignored.

use std::cell::Cell;
use std::fmt;
use std::time::Duration;

use crate::analysis::{AnalysisResult, RenderedAnalysis};
use crate::config::ControllerConfig;
use crate::error::{AnalyzeError, FileRejection, FormError};
use crate::file_check::{check_file, FileSummary, SelectedFile};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::validation::{validate_form, FormField, FormSnapshot};

/// A picked file: what the checks need plus the host's own handle to upload
#[derive(Debug, Clone)]
pub struct PickedFile<F> {
    pub meta: SelectedFile,
    pub handle: F,
}

/// The multipart payload: `cv`, `jobDescription`, `apiKey`
pub struct AnalyzeRequest<F> {
    pub cv: F,
    pub cv_name: String,
    pub job_description: String,
    pub api_key: String,
}

impl<F> fmt::Debug for AnalyzeRequest<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzeRequest")
            .field("cv_name", &self.cv_name)
            .field("job_description_chars", &self.job_description.chars().count())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Everything the controller reads from or writes to the page
pub trait FormView {
    /// Host handle for the picked file (a `web_sys::File` in the browser)
    type File;

    fn api_key(&self) -> String;
    fn job_description(&self) -> String;
    fn selected_file(&self) -> Option<PickedFile<Self::File>>;

    /// Show the accepted file, or reset the display when `None`
    fn show_file(&self, summary: Option<&FileSummary>);
    fn clear_file_input(&self);

    /// Replace any visible error banner with `message`
    fn show_error(&self, message: &str);
    fn highlight(&self, field: FormField, duration: Duration);

    /// Disable the trigger with a busy label, or restore it
    fn set_busy(&self, busy: bool);
    /// Show the loader and hide previous results
    fn show_loader(&self);
    fn hide_loader(&self);

    /// Fill the results panel; `false` means nothing was rendered
    fn render_results(&self, analysis: &RenderedAnalysis) -> bool;
}

/// Sends one analysis request and returns the raw success body
#[allow(async_fn_in_trait)]
pub trait AnalyzeTransport<F> {
    async fn send(&self, request: &AnalyzeRequest<F>) -> Result<String, AnalyzeError>;
}

/// Backoff clock
#[allow(async_fn_in_trait)]
pub trait Sleep {
    async fn sleep(&self, duration: Duration);
}

/// Result of a file pick or drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Accepted(FileSummary),
    Rejected(FileRejection),
    Cleared,
}

/// Result of one submission trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rendered,
    Invalid(FormError),
    Failed(AnalyzeError),
    AlreadyRunning,
}

pub struct FormController<V, T, S> {
    view: V,
    transport: T,
    sleeper: S,
    config: ControllerConfig,
    policy: RetryPolicy,
    in_flight: Cell<bool>,
}

impl<V, T, S> FormController<V, T, S>
where
    V: FormView,
    T: AnalyzeTransport<V::File>,
    S: Sleep,
{
    pub fn new(view: V, transport: T, sleeper: S, config: ControllerConfig) -> Self {
        let policy = RetryPolicy::from(&config.retry);
        Self {
            view,
            transport,
            sleeper,
            config,
            policy,
            in_flight: Cell::new(false),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.get()
    }

    /// Check a picked or dropped file and update the file display
    pub fn select_file(&self, file: Option<SelectedFile>) -> FileSelection {
        let Some(file) = file else {
            self.view.show_file(None);
            return FileSelection::Cleared;
        };

        match check_file(&file, &self.config.files) {
            Ok(summary) => {
                tracing::info!(file = %summary.name, size = %summary.size_label, "CV file selected");
                self.view.show_file(Some(&summary));
                FileSelection::Accepted(summary)
            }
            Err(rejection) => {
                tracing::warn!(file = %file.name, size = file.size, reason = %rejection, "CV file rejected");
                self.view.show_error(&rejection.to_string());
                self.view.clear_file_input();
                self.view.show_file(None);
                FileSelection::Rejected(rejection)
            }
        }
    }

    /// Validate the form, surfacing at most one error
    pub fn validate(&self) -> bool {
        match self.snapshot() {
            Ok(_) => true,
            Err(err) => {
                self.report_invalid(&err);
                false
            }
        }
    }

    /// Validate, post with retry, and render
    ///
    /// Failures are shown in the error banner; the returned outcome is for
    /// callers that want to log or test the cycle.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.in_flight.get() {
            tracing::debug!("Submission already in flight, ignoring trigger");
            return SubmitOutcome::AlreadyRunning;
        }

        let request = match self.snapshot() {
            Ok(request) => request,
            Err(err) => {
                self.report_invalid(&err);
                return SubmitOutcome::Invalid(err);
            }
        };

        self.in_flight.set(true);
        self.view.show_loader();
        self.view.set_busy(true);
        tracing::info!(file = %request.cv_name, endpoint = %self.config.endpoint, "Submitting CV for analysis");

        let outcome = match self.analyze(&request).await {
            Ok(()) => {
                tracing::info!("Analysis rendered");
                SubmitOutcome::Rendered
            }
            Err(err) => {
                tracing::error!(error = %err, "Analysis failed");
                self.view.hide_loader();
                self.view.show_error(&err.user_message());
                SubmitOutcome::Failed(err)
            }
        };

        self.view.set_busy(false);
        self.in_flight.set(false);
        outcome
    }

    async fn analyze(&self, request: &AnalyzeRequest<V::File>) -> Result<(), AnalyzeError> {
        let transport = &self.transport;
        let sleeper = &self.sleeper;

        let body = retry_with_backoff(
            &self.policy,
            move |delay| sleeper.sleep(delay),
            move || transport.send(request),
        )
        .await?;

        let result = AnalysisResult::parse(&body)?;
        let rendered = RenderedAnalysis::from(&result);
        tracing::debug!(
            score = rendered.score.value(),
            ats_score = rendered.ats_score.value(),
            sections = rendered.sections.len(),
            "Rendering analysis"
        );

        if self.view.render_results(&rendered) {
            Ok(())
        } else {
            Err(AnalyzeError::Render)
        }
    }

    fn snapshot(&self) -> Result<AnalyzeRequest<V::File>, FormError> {
        let api_key = self.view.api_key();
        let job_description = self.view.job_description();
        let picked = self.view.selected_file();

        validate_form(
            &FormSnapshot {
                api_key: &api_key,
                file: picked.as_ref().map(|p| &p.meta),
                job_description: &job_description,
            },
            &self.config.form,
        )?;

        let picked = picked.ok_or(FormError::MissingFile)?;
        Ok(AnalyzeRequest {
            cv: picked.handle,
            cv_name: picked.meta.name,
            job_description,
            api_key,
        })
    }

    fn report_invalid(&self, err: &FormError) {
        tracing::debug!(error = %err, "Form validation failed");
        self.view.show_error(&err.to_string());
        if let Some(field) = err.highlight() {
            self.view.highlight(field, self.config.form.highlight());
        }
    }
}
