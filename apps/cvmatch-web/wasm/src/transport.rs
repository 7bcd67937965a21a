//! Multipart upload over `fetch`

use cvmatch_core::{AnalyzeError, AnalyzeRequest, AnalyzeTransport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, Response};

use crate::dom::js_error_message;

fn network(err: JsValue) -> AnalyzeError {
    AnalyzeError::Network(js_error_message(&err))
}

/// Posts the form to the analysis endpoint
#[derive(Debug, Clone)]
pub struct FetchTransport {
    endpoint: String,
}

impl FetchTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, request: &AnalyzeRequest<File>) -> Result<Request, JsValue> {
        let form = FormData::new()?;
        form.append_with_blob_and_filename("cv", &request.cv, &request.cv_name)?;
        form.append_with_str("jobDescription", &request.job_description)?;
        form.append_with_str("apiKey", &request.api_key)?;

        // The browser sets the multipart boundary header itself
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&form);

        Request::new_with_str_and_init(&self.endpoint, &opts)
    }
}

impl AnalyzeTransport<File> for FetchTransport {
    async fn send(&self, request: &AnalyzeRequest<File>) -> Result<String, AnalyzeError> {
        let window =
            web_sys::window().ok_or_else(|| AnalyzeError::Network("No window".to_string()))?;
        let http_request = self.build_request(request).map_err(network)?;

        let response = JsFuture::from(window.fetch_with_request(&http_request))
            .await
            .map_err(network)?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| AnalyzeError::InvalidResponse("fetch did not return a Response".into()))?;

        let body = match response.text() {
            Ok(promise) => JsFuture::from(promise).await.ok().and_then(|v| v.as_string()),
            Err(_) => None,
        };

        if !response.ok() {
            tracing::warn!(status = response.status(), "Analysis endpoint returned an error status");
            return Err(AnalyzeError::from_status(
                response.status(),
                body.as_deref().unwrap_or_default(),
            ));
        }

        body.ok_or_else(|| AnalyzeError::InvalidResponse("Response body is not text".into()))
    }
}
