//! Typed access to the page
//!
//! The form elements are looked up once at mount. Result elements are looked
//! up at render time, because the results panel may be swapped out by the host
//! page between submissions.

use cvmatch_core::Section;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Window,
};

#[derive(Debug, Error)]
pub enum DomError {
    #[error("No window available")]
    NoWindow,

    #[error("No document available")]
    NoDocument,

    #[error("Element {0} not found")]
    Missing(&'static str),

    #[error("Element {0} has an unexpected type")]
    WrongType(&'static str),

    #[error("{0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(js_error_message(&value))
    }
}

impl From<DomError> for JsValue {
    fn from(err: DomError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text for a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Log a failed DOM call whose caller has nothing to report it to
///
/// Returns whether the call succeeded.
pub fn log_failure<T>(result: Result<T, JsValue>, action: &'static str) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %js_error_message(&err), action, "DOM update failed");
            false
        }
    }
}

pub fn window() -> Result<Window, DomError> {
    web_sys::window().ok_or(DomError::NoWindow)
}

pub fn document() -> Result<Document, DomError> {
    window()?.document().ok_or(DomError::NoDocument)
}

fn by_id<T: JsCast>(document: &Document, id: &'static str) -> Result<T, DomError> {
    document
        .get_element_by_id(id)
        .ok_or(DomError::Missing(id))?
        .dyn_into::<T>()
        .map_err(|_| DomError::WrongType(id))
}

fn by_selector<T: JsCast>(document: &Document, selector: &'static str) -> Result<T, DomError> {
    document
        .query_selector(selector)?
        .ok_or(DomError::Missing(selector))?
        .dyn_into::<T>()
        .map_err(|_| DomError::WrongType(selector))
}

/// Every element the form handlers touch
#[derive(Debug, Clone)]
pub struct FormElements {
    pub file_input: HtmlInputElement,
    pub file_name: HtmlElement,
    pub file_text: HtmlElement,
    pub file_label: HtmlElement,
    pub analyze_btn: HtmlButtonElement,
    pub job_description: HtmlTextAreaElement,
    pub api_key: HtmlInputElement,
    pub toggle_password: HtmlElement,
    pub input_section: HtmlElement,
    pub loader: HtmlElement,
    pub results: HtmlElement,
}

impl FormElements {
    pub fn resolve(document: &Document) -> Result<Self, DomError> {
        Ok(Self {
            file_input: by_id(document, "cv")?,
            file_name: by_id(document, "file-name")?,
            file_text: by_selector(document, ".file-text")?,
            file_label: by_selector(document, ".file-label")?,
            analyze_btn: by_id(document, "analyzeBtn")?,
            job_description: by_id(document, "jobDescription")?,
            api_key: by_id(document, "apiKey")?,
            toggle_password: by_selector(document, ".toggle-password")?,
            input_section: by_selector(document, ".input-section")?,
            loader: by_id(document, "loader")?,
            results: by_id(document, "results")?,
        })
    }
}

/// Score displays and the four text sections
#[derive(Debug, Clone)]
pub struct ResultElements {
    pub score: HtmlElement,
    pub ats_score: HtmlElement,
    pub sections: Vec<(Section, HtmlElement)>,
}

impl ResultElements {
    pub fn resolve(document: &Document) -> Result<Self, DomError> {
        let sections = Section::ALL
            .iter()
            .map(|&section| Ok((section, by_id(document, section.element_id())?)))
            .collect::<Result<Vec<_>, DomError>>()?;

        Ok(Self {
            score: by_id(document, "scoreValue")?,
            ats_score: by_id(document, "atsScoreValue")?,
            sections,
        })
    }

    pub fn section(&self, section: Section) -> Option<&HtmlElement> {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, element)| element)
    }
}
