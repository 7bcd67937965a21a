//! Core logic for the CV match form
//!
//! Everything here is host-independent and unit tested natively. The browser
//! crate (`cvmatch-wasm`) supplies the page, network, storage and timer
//! implementations of the traits in [`controller`] and [`storage`].
//!
//! ## Modules
//!
//! - [`file_check`]: extension allow-list, size limit, human readable sizes
//! - [`validation`]: ordered form checks, one error per attempt
//! - [`analysis`]: response model, score clamping, section formatting
//! - [`retry`]: exponential backoff loop
//! - [`draft`]: debounced job description autosave
//! - [`banner`]: single-slot error banner bookkeeping
//! - [`controller`]: the submission workflow
//! - [`config`]: TOML configuration with defaults

pub mod analysis;
pub mod banner;
pub mod config;
pub mod controller;
pub mod controls;
pub mod draft;
pub mod error;
pub mod file_check;
pub mod retry;
pub mod storage;
pub mod validation;

pub use analysis::{AnalysisResult, RenderedAnalysis, RenderedSection, Score, Section};
pub use banner::{BannerId, BannerSlot, BannerTiming};
pub use config::ControllerConfig;
pub use controller::{
    AnalyzeRequest, AnalyzeTransport, FileSelection, FormController, FormView, PickedFile, Sleep,
    SubmitOutcome,
};
pub use controls::{is_submit_shortcut, KeyVisibility};
pub use draft::{DebounceTicket, Debouncer, DraftAutosave, JobDescriptionDraft, DRAFT_STORAGE_KEY};
pub use error::{AnalyzeError, FileRejection, FormError, StorageError};
pub use file_check::{check_file, format_file_size, FileSummary, SelectedFile};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use storage::{KeyValueStore, MemoryStore};
pub use validation::{validate_form, FormField, FormSnapshot};
