//! Small browser helpers that have no server-side counterpart.

/// Offer `text` as a file download.
#[cfg(feature = "hydrate")]
pub fn download_text(file_name: &str, mime: &str, text: &str) -> Result<(), String> {
    use wasm_bindgen::{JsCast, JsValue};

    let js_err = |e: JsValue| format!("{e:?}");

    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(text));
    let opts = web_sys::BlobPropertyBag::new();
    opts.set_type(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &opts).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "cannot create download link".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(js_err)
}

#[cfg(not(feature = "hydrate"))]
pub fn download_text(_file_name: &str, _mime: &str, _text: &str) -> Result<(), String> {
    Err("downloads are only available in the browser".into())
}

/// Today's date in the browser's clock (UTC on the server).
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
