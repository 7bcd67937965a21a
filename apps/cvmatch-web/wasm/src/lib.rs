//! WASM bindings for the CV match form
//!
//! The workflow (validation, retry, formatting) lives in `cvmatch-core`; this
//! crate implements its seams over `web-sys` and binds the page events.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { mount, mountWithConfig } from './pkg/cvmatch_wasm.js';
//!
//! await init();
//!
//! // Stock settings
//! mount();
//!
//! // Or override some of them
//! mountWithConfig(`
//!     endpoint = "/api/analyze"
//!
//!     [retry]
//!     max_attempts = 5
//! `);
//! ```

pub mod app;
pub mod dom;
pub mod logging;
pub mod storage;
pub mod timers;
pub mod transport;
pub mod view;

use std::cell::RefCell;
use std::rc::Rc;

use cvmatch_core::ControllerConfig;
use wasm_bindgen::prelude::*;

pub use app::App;
pub use dom::{DomError, FormElements, ResultElements};
pub use storage::LocalStore;
pub use timers::BrowserSleeper;
pub use transport::FetchTransport;
pub use view::DomView;

thread_local! {
    static MOUNTED: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
}

/// Bind the form with default settings
///
/// Returns false (and logs) when the page lacks a required element.
#[wasm_bindgen]
pub fn mount() -> bool {
    mount_with(ControllerConfig::default())
}

/// Bind the form with settings from a TOML document
#[wasm_bindgen(js_name = mountWithConfig)]
pub fn mount_with_config(config: &str) -> Result<bool, JsValue> {
    let config =
        ControllerConfig::from_str(config).map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
    Ok(mount_with(config))
}

fn mount_with(config: ControllerConfig) -> bool {
    if MOUNTED.with(|mounted| mounted.borrow().is_some()) {
        tracing::warn!("CV form already mounted");
        return true;
    }

    match app::mount(config) {
        Ok(app) => {
            MOUNTED.with(|mounted| *mounted.borrow_mut() = Some(app));
            true
        }
        Err(err) => {
            tracing::error!(error = %err, "Required DOM elements not found");
            false
        }
    }
}

/// Default settings as a plain object
#[wasm_bindgen(js_name = defaultConfig)]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&ControllerConfig::default())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Human readable file size ("1.5 KB")
#[wasm_bindgen(js_name = formatFileSize)]
pub fn format_file_size(bytes: f64) -> String {
    cvmatch_core::format_file_size(bytes.max(0.0) as u64)
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0.0), "0 Bytes");
        assert_eq!(format_file_size(1024.0), "1 KB");
        assert_eq!(format_file_size(1536.0), "1.5 KB");
        assert_eq!(format_file_size(-5.0), "0 Bytes");
    }
}
