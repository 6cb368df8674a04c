use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use machigai_core::{AssetManifest, Template, TemplateError};

pub(crate) const MANIFEST_URL: &str = "assets/manifest.json";
pub(crate) const TEMPLATE_DIR: &str = "templates";
pub(crate) const BACKGROUND_DIR: &str = "assets/backgrounds";
pub(crate) const SPRITE_DIR: &str = "assets/sprites";

#[derive(Debug, thiserror::Error)]
pub(crate) enum AssetError {
    #[error("could not fetch {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("asset manifest is not valid json: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("invalid template: {0}")]
    Template(#[from] TemplateError),
}

impl AssetError {
    /// Malformed data is shown to the user; network trouble is only logged.
    pub(crate) fn is_validation(&self) -> bool {
        matches!(self, AssetError::Manifest(_) | AssetError::Template(_))
    }
}

pub(crate) fn background_url(filename: &str) -> String {
    format!("{BACKGROUND_DIR}/{filename}")
}

pub(crate) fn sprite_url(filename: &str) -> String {
    format!("{SPRITE_DIR}/{filename}")
}

pub(crate) fn template_url(name: &str) -> String {
    format!("{TEMPLATE_DIR}/{name}.json")
}

fn fetch_error(url: &str, err: JsValue) -> AssetError {
    AssetError::Fetch {
        url: url.to_string(),
        message: err.as_string().unwrap_or_else(|| format!("{err:?}")),
    }
}

async fn fetch_text(url: &str) -> Result<String, AssetError> {
    let Some(window) = web_sys::window() else {
        return Err(fetch_error(url, JsValue::from_str("no window")));
    };
    let value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| fetch_error(url, err))?;
    let response: Response = value.dyn_into().map_err(|err| fetch_error(url, err))?;
    if !response.ok() {
        return Err(AssetError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let promise = response.text().map_err(|err| fetch_error(url, err))?;
    let text = JsFuture::from(promise)
        .await
        .map_err(|err| fetch_error(url, err))?;
    text.as_string()
        .ok_or_else(|| fetch_error(url, JsValue::from_str("body is not text")))
}

pub(crate) async fn load_manifest() -> Result<AssetManifest, AssetError> {
    let raw = fetch_text(MANIFEST_URL).await?;
    Ok(AssetManifest::from_json(&raw)?)
}

pub(crate) async fn load_template(name: &str) -> Result<Template, AssetError> {
    let raw = fetch_text(&template_url(name)).await?;
    Ok(Template::from_json(&raw)?)
}
