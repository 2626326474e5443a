//! Contact form transport: collects fields and performs the POST with `fetch`.

use folio_page_core::{EndpointResponse, SubmissionRequest, TransportError};
use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{FormData, HtmlFormElement, RequestInit, Response};

use crate::dom::{self, SharedHost};

/// Text fields of `form` in document order. File inputs are skipped.
pub(crate) fn collect_fields(form: &HtmlFormElement) -> Vec<(String, String)> {
    let Ok(data) = FormData::new_with_form(form) else {
        return Vec::new();
    };
    let Ok(Some(entries)) = js_sys::try_iter(&data) else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter_map(|entry| {
            let pair = Array::from(&entry);
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

fn network(err: JsValue) -> TransportError {
    TransportError::Network(format!("{err:?}"))
}

async fn post(request: &SubmissionRequest) -> Result<EndpointResponse, TransportError> {
    let window =
        web_sys::window().ok_or_else(|| TransportError::Network("no window".to_string()))?;
    let body = FormData::new().map_err(network)?;
    for (name, value) in &request.fields {
        body.append_with_str(name, value).map_err(network)?;
    }

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&body);

    let response: Response = JsFuture::from(window.fetch_with_str_and_init(&request.endpoint, &init))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(network)?;
    let status = response.status();
    let text = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(|e| TransportError::MalformedResponse(format!("{e:?}")))?;
    Ok(EndpointResponse {
        status,
        body: text.as_string().unwrap_or_default(),
    })
}

/// Send the request in the background and feed the outcome back to the core.
pub(crate) fn dispatch(host: SharedHost, request: SubmissionRequest) {
    spawn_local(async move {
        let outcome = post(&request).await;
        dom::drive(&host, |h| h.core.complete_contact(request.id, outcome));
    });
}
