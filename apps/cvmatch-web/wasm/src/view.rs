//! `FormView` over the live page

use std::rc::Rc;
use std::time::Duration;

use cvmatch_core::config::ResultsConfig;
use cvmatch_core::{
    BannerId, BannerSlot, BannerTiming, ControllerConfig, FileSummary, FormField, FormView,
    PickedFile, RenderedAnalysis, SelectedFile,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, File, HtmlElement, ScrollBehavior, ScrollIntoViewOptions};

use crate::dom::{log_failure, DomError, FormElements, ResultElements};
use crate::timers::set_timeout;

const HIGHLIGHT_CLASS: &str = "highlight";
const HIDDEN_CLASS: &str = "hidden";
const BUSY_LABEL: &str = r#"<i class="fas fa-spinner fa-spin"></i> Analyzing..."#;
const IDLE_LABEL: &str = r#"<i class="fas fa-search"></i> Analyze CV"#;

/// Size and name of a browser file, as the checks see it
pub fn file_meta(file: &File) -> SelectedFile {
    SelectedFile::new(file.name(), file.size().max(0.0) as u64)
}

pub struct DomView {
    document: Document,
    elements: FormElements,
    banner: Rc<BannerSlot>,
    banner_timing: BannerTiming,
    results: ResultsConfig,
}

impl DomView {
    pub fn new(document: Document, elements: FormElements, config: &ControllerConfig) -> Self {
        Self {
            document,
            elements,
            banner: Rc::new(BannerSlot::new()),
            banner_timing: BannerTiming::from(&config.banner),
            results: config.results.clone(),
        }
    }

    pub fn elements(&self) -> &FormElements {
        &self.elements
    }

    fn field(&self, field: FormField) -> &HtmlElement {
        match field {
            FormField::ApiKey => &self.elements.api_key,
            FormField::JobDescription => &self.elements.job_description,
        }
    }

    fn remove_banners(&self) -> Result<(), DomError> {
        let existing = self.document.query_selector_all(".error-message")?;
        for i in 0..existing.length() {
            if let Some(node) = existing.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                node.remove();
            }
        }
        Ok(())
    }

    fn build_banner(&self, message: &str) -> Result<Element, DomError> {
        let banner = self.document.create_element("div")?;
        banner.set_class_name("error-message shake");

        let icon = self.document.create_element("i")?;
        icon.set_class_name("fas fa-exclamation-circle");

        // Text content, never markup: messages may carry server text
        let text = self.document.create_element("span")?;
        text.set_text_content(Some(message));

        let close = self.document.create_element("button")?;
        close.set_class_name("close-error");
        close.set_text_content(Some("×"));

        banner.append_child(&icon)?;
        banner.append_child(&text)?;
        banner.append_child(&close)?;
        Ok(banner)
    }

    fn try_show_error(&self, message: &str) -> Result<(), DomError> {
        self.remove_banners()?;
        let (id, _) = self.banner.show();
        let banner = self.build_banner(message)?;

        if let Some(close) = banner.query_selector(".close-error")? {
            let on_close = {
                let banner = banner.clone();
                let slot = Rc::clone(&self.banner);
                Closure::once_into_js(move || {
                    banner.remove();
                    slot.dismiss(id);
                })
            };
            close.add_event_listener_with_callback("click", on_close.unchecked_ref())?;
        }

        self.elements.input_section.append_child(&banner)?;

        if let Some(display) = self.banner_timing.display {
            schedule_fade(
                Rc::clone(&self.banner),
                id,
                banner,
                display,
                self.banner_timing.fade,
            )?;
        }
        Ok(())
    }

    fn try_render(&self, analysis: &RenderedAnalysis) -> Result<(), DomError> {
        let targets = ResultElements::resolve(&self.document)?;

        targets
            .score
            .set_text_content(Some(&analysis.score.to_string()));
        targets
            .ats_score
            .set_text_content(Some(&analysis.ats_score.to_string()));

        for rendered in &analysis.sections {
            if let Some(element) = targets.section(rendered.section) {
                element.set_inner_html(&rendered.html);
            }
        }

        self.elements.loader.class_list().add_1(HIDDEN_CLASS)?;
        self.elements.results.class_list().remove_1(HIDDEN_CLASS)?;

        let scroll = ScrollIntoViewOptions::new();
        scroll.set_behavior(ScrollBehavior::Smooth);
        self.elements
            .results
            .scroll_into_view_with_scroll_into_view_options(&scroll);

        let sections = self.document.query_selector_all(".result-section")?;
        for i in 0..sections.length() {
            if let Some(section) = sections.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
                section
                    .style()
                    .set_property("animation-delay", &self.results.animation_delay(i as usize))?;
            }
        }
        Ok(())
    }
}

/// Fade an unattended banner out, unless it was replaced or closed first
fn schedule_fade(
    slot: Rc<BannerSlot>,
    id: BannerId,
    banner: Element,
    display: Duration,
    fade: Duration,
) -> Result<(), DomError> {
    set_timeout(display, move || {
        if !slot.is_current(id) || banner.parent_element().is_none() {
            return;
        }
        log_failure(banner.class_list().add_1("fade-out"), "fade banner");
        let removal = set_timeout(fade, move || {
            banner.remove();
            slot.dismiss(id);
        });
        if let Err(err) = removal {
            tracing::warn!(error = %err, "Could not schedule banner removal");
        }
    })?;
    Ok(())
}

impl FormView for DomView {
    type File = File;

    fn api_key(&self) -> String {
        self.elements.api_key.value()
    }

    fn job_description(&self) -> String {
        self.elements.job_description.value()
    }

    fn selected_file(&self) -> Option<PickedFile<File>> {
        let file = self.elements.file_input.files()?.get(0)?;
        Some(PickedFile {
            meta: file_meta(&file),
            handle: file,
        })
    }

    fn show_file(&self, summary: Option<&FileSummary>) {
        let file_name = &self.elements.file_name;
        let file_text = &self.elements.file_text;

        match summary {
            Some(summary) => {
                file_name.set_text_content(Some(&summary.name));
                if let Ok(size) = self.document.create_element("span") {
                    size.set_class_name("file-size");
                    size.set_text_content(Some(&format!("({})", summary.size_label)));
                    log_failure(file_name.append_child(&size), "append file size");
                }
                file_text.set_text_content(Some("File selected"));
                log_failure(
                    file_name
                        .style()
                        .set_property("color", "var(--success-color)"),
                    "color file name",
                );
            }
            None => {
                file_name.set_text_content(Some(""));
                file_text.set_text_content(Some("Choose file"));
                log_failure(file_name.style().remove_property("color"), "reset file name color");
            }
        }
    }

    fn clear_file_input(&self) {
        self.elements.file_input.set_value("");
    }

    fn show_error(&self, message: &str) {
        if let Err(err) = self.try_show_error(message) {
            tracing::error!(error = %err, banner = message, "Could not display error banner");
        }
    }

    fn highlight(&self, field: FormField, duration: Duration) {
        let element = self.field(field).clone();
        if !log_failure(element.class_list().add_1(HIGHLIGHT_CLASS), "add highlight") {
            return;
        }
        let cleared = set_timeout(duration, move || {
            log_failure(element.class_list().remove_1(HIGHLIGHT_CLASS), "remove highlight");
        });
        if let Err(err) = cleared {
            tracing::warn!(error = %err, ?field, "Could not schedule highlight removal");
        }
    }

    fn set_busy(&self, busy: bool) {
        let button = &self.elements.analyze_btn;
        button.set_disabled(busy);
        button.set_inner_html(if busy { BUSY_LABEL } else { IDLE_LABEL });
    }

    fn show_loader(&self) {
        log_failure(self.elements.loader.class_list().remove_1(HIDDEN_CLASS), "show loader");
        log_failure(self.elements.results.class_list().add_1(HIDDEN_CLASS), "hide results");
    }

    fn hide_loader(&self) {
        log_failure(self.elements.loader.class_list().add_1(HIDDEN_CLASS), "hide loader");
    }

    fn render_results(&self, analysis: &RenderedAnalysis) -> bool {
        match self.try_render(analysis) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "Error updating results");
                false
            }
        }
    }
}
