//! `setTimeout` helpers

use std::time::Duration;

use cvmatch_core::Sleep;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::dom::{self, DomError};

fn millis(delay: Duration) -> i32 {
    delay.as_millis().min(i32::MAX as u128) as i32
}

/// Run `callback` once after `delay`
pub fn set_timeout(delay: Duration, callback: impl FnOnce() + 'static) -> Result<i32, DomError> {
    let callback = Closure::once_into_js(callback);
    let handle = dom::window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis(delay),
        )?;
    Ok(handle)
}

/// Resolve after `delay`; resolves immediately if no timer can be scheduled
pub async fn sleep(delay: Duration) {
    let promise = Promise::new(&mut |resolve, _reject| {
        let fallback = resolve.clone();
        let scheduled = set_timeout(delay, move || {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        });
        if let Err(err) = scheduled {
            tracing::warn!(error = %err, "Could not schedule timer, continuing without delay");
            let _ = fallback.call0(&JsValue::UNDEFINED);
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// Backoff clock over `setTimeout`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSleeper;

impl Sleep for BrowserSleeper {
    async fn sleep(&self, duration: Duration) {
        sleep(duration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), i32::MAX);
    }
}
