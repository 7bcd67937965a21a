//! Mounting: build the controller over the page and bind its events
//!
//! Handlers are long-lived closures that are leaked with `forget`, so every
//! handler holds an `Rc` to the mounted [`App`] and the app lives for the
//! rest of the page.

use std::rc::Rc;

use cvmatch_core::{
    is_submit_shortcut, ControllerConfig, DraftAutosave, FormController, KeyVisibility,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, DragEvent, Event, EventTarget, FileList, KeyboardEvent};

use crate::dom::{self, log_failure, DomError, FormElements};
use crate::storage::LocalStore;
use crate::timers::{self, BrowserSleeper};
use crate::transport::FetchTransport;
use crate::view::{file_meta, DomView};

pub type BrowserController = FormController<DomView, FetchTransport, BrowserSleeper>;

pub struct App {
    controller: BrowserController,
    autosave: DraftAutosave<LocalStore>,
    elements: FormElements,
}

impl App {
    pub fn controller(&self) -> &BrowserController {
        &self.controller
    }

    fn select_from(&self, files: Option<FileList>) {
        let picked = files.and_then(|files| files.get(0)).map(|file| file_meta(&file));
        self.controller.select_file(picked);
    }

    fn restore_draft(&self) {
        if let Some(text) = self.autosave.restore() {
            tracing::debug!(chars = text.chars().count(), "Restored saved job description");
            self.elements.job_description.set_value(&text);
        }
    }

    fn toggle_key_visibility(&self) {
        let input = &self.elements.api_key;
        let current =
            KeyVisibility::from_input_type(&input.get_attribute("type").unwrap_or_default());
        let next = current.toggled();

        if let Err(err) = input.set_attribute("type", next.input_type()) {
            tracing::warn!(error = %DomError::from(err), "Could not toggle API key visibility");
            return;
        }
        self.elements
            .toggle_password
            .set_inner_html(&format!(r#"<i class="{}"></i>"#, next.icon_class()));
    }

    fn clear_job_description(&self) {
        self.elements.job_description.set_value("");
        if let Err(err) = self.autosave.clear() {
            tracing::warn!(error = %err, "Could not clear saved job description");
        }
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), DomError> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Resolve the page, restore the saved draft and bind every handler
pub fn mount(config: ControllerConfig) -> Result<Rc<App>, DomError> {
    let document = dom::document()?;
    let elements = FormElements::resolve(&document)?;

    let view = DomView::new(document.clone(), elements.clone(), &config);
    let transport = FetchTransport::new(config.endpoint.clone());
    let autosave = DraftAutosave::new(LocalStore::new(), &config.autosave);

    let app = Rc::new(App {
        controller: FormController::new(view, transport, BrowserSleeper, config),
        autosave,
        elements,
    });

    app.restore_draft();
    bind_drag_and_drop(&app)?;
    bind_file_input(&app)?;
    bind_toggle_password(&app)?;
    bind_analyze(&app)?;
    bind_shortcut(&app, &document)?;
    bind_autosave(&app)?;
    insert_clear_button(&app, &document)?;

    tracing::info!(endpoint = %app.controller.config().endpoint, "CV form mounted");
    Ok(app)
}

fn bind_drag_and_drop(app: &Rc<App>) -> Result<(), DomError> {
    let label = app.elements.file_label.clone();

    for name in ["dragenter", "dragover", "dragleave", "drop"] {
        let highlight = matches!(name, "dragenter" | "dragover");
        let target = label.clone();
        listen(&label, name, move |event| {
            event.prevent_default();
            event.stop_propagation();
            let classes = target.class_list();
            let toggled = if highlight {
                classes.add_1("highlight")
            } else {
                classes.remove_1("highlight")
            };
            log_failure(toggled, "toggle drop highlight");
        })?;
    }

    let app = Rc::clone(app);
    listen(&label, "drop", move |event| {
        let files = event
            .dyn_ref::<DragEvent>()
            .and_then(|e| e.data_transfer())
            .and_then(|transfer| transfer.files());
        if let Some(files) = &files {
            app.elements.file_input.set_files(Some(files));
        }
        app.select_from(files);
    })
}

fn bind_file_input(app: &Rc<App>) -> Result<(), DomError> {
    let handler = Rc::clone(app);
    listen(&app.elements.file_input, "change", move |_| {
        handler.select_from(handler.elements.file_input.files());
    })
}

fn bind_toggle_password(app: &Rc<App>) -> Result<(), DomError> {
    let handler = Rc::clone(app);
    listen(&app.elements.toggle_password, "click", move |_| {
        handler.toggle_key_visibility();
    })
}

fn bind_analyze(app: &Rc<App>) -> Result<(), DomError> {
    let handler = Rc::clone(app);
    listen(&app.elements.analyze_btn, "click", move |_| {
        let app = Rc::clone(&handler);
        spawn_local(async move {
            let outcome = app.controller.submit().await;
            tracing::debug!(?outcome, "Submission finished");
        });
    })
}

/// Ctrl+Enter clicks the trigger, so a disabled trigger ignores it
fn bind_shortcut(app: &Rc<App>, document: &Document) -> Result<(), DomError> {
    let handler = Rc::clone(app);
    listen(document, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if is_submit_shortcut(key.ctrl_key(), &key.key()) {
            handler.elements.analyze_btn.click();
        }
    })
}

fn bind_autosave(app: &Rc<App>) -> Result<(), DomError> {
    let handler = Rc::clone(app);
    listen(&app.elements.job_description, "input", move |_| {
        let ticket = handler.autosave.on_input();
        let app = Rc::clone(&handler);
        let scheduled = timers::set_timeout(handler.autosave.delay(), move || {
            let text = app.elements.job_description.value();
            if let Err(err) = app.autosave.fire(ticket, &text) {
                tracing::warn!(error = %err, "Could not save job description");
            }
        });
        if let Err(err) = scheduled {
            tracing::warn!(error = %err, "Could not schedule autosave");
        }
    })
}

fn insert_clear_button(app: &Rc<App>, document: &Document) -> Result<(), DomError> {
    let textarea = &app.elements.job_description;
    let parent = textarea
        .parent_node()
        .ok_or(DomError::Missing("jobDescription parent"))?;

    let button = document.create_element("button")?;
    button.set_attribute("type", "button")?;
    button.set_class_name("clear-btn");
    button.set_inner_html(r#"<i class="fas fa-times"></i> Clear"#);

    let handler = Rc::clone(app);
    listen(&button, "click", move |_| handler.clear_job_description())?;

    parent.insert_before(&button, textarea.next_sibling().as_ref())?;
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::dom::wasm_tests::{install, FORM_MARKUP};
    use cvmatch_core::{KeyValueStore, DRAFT_STORAGE_KEY};
    use wasm_bindgen_test::*;
    use web_sys::HtmlElement;

    wasm_bindgen_test_configure!(run_in_browser);

    fn click(document: &Document, selector: &str) {
        document
            .query_selector(selector)
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap()
            .click();
    }

    #[wasm_bindgen_test]
    fn test_mount_restores_saved_draft() {
        let document = install(FORM_MARKUP);
        let store = LocalStore::new();
        store
            .set(DRAFT_STORAGE_KEY, "Senior Rust engineer, remote")
            .unwrap();

        let app = mount(ControllerConfig::default()).unwrap();
        assert_eq!(
            app.elements.job_description.value(),
            "Senior Rust engineer, remote"
        );

        let next = app.elements.job_description.next_element_sibling().unwrap();
        assert_eq!(next.class_name(), "clear-btn");
        assert_eq!(document.query_selector_all(".clear-btn").unwrap().length(), 1);

        store.remove(DRAFT_STORAGE_KEY).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_clear_empties_field_and_storage() {
        let document = install(FORM_MARKUP);
        let store = LocalStore::new();
        store
            .set(DRAFT_STORAGE_KEY, "Platform engineer with Kubernetes")
            .unwrap();

        let app = mount(ControllerConfig::default()).unwrap();
        assert!(!app.elements.job_description.value().is_empty());

        click(&document, ".clear-btn");
        assert_eq!(app.elements.job_description.value(), "");
        assert_eq!(store.get(DRAFT_STORAGE_KEY), None);
    }

    #[wasm_bindgen_test]
    fn test_toggle_password_swaps_type_and_icon() {
        let document = install(FORM_MARKUP);
        let app = mount(ControllerConfig::default()).unwrap();
        let icon_class = || {
            document
                .query_selector(".toggle-password i")
                .unwrap()
                .unwrap()
                .class_name()
        };

        click(&document, ".toggle-password");
        assert_eq!(
            app.elements.api_key.get_attribute("type").as_deref(),
            Some("text")
        );
        assert_eq!(icon_class(), "fas fa-eye-slash");

        click(&document, ".toggle-password");
        assert_eq!(
            app.elements.api_key.get_attribute("type").as_deref(),
            Some("password")
        );
        assert_eq!(icon_class(), "fas fa-eye");
    }

    #[wasm_bindgen_test]
    fn test_mount_fails_without_form() {
        install("<main></main>");
        assert!(matches!(
            mount(ControllerConfig::default()),
            Err(DomError::Missing("cv"))
        ));
    }
}
