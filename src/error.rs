use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid page config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while attaching to the rendered page.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("no window or document available")]
    NoWindow,
    #[error("missing element `{0}`")]
    MissingElement(String),
    #[error("selector `{0}` was rejected by the browser")]
    Selector(String),
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

impl BindError {
    #[cfg(target_arch = "wasm32")]
    pub(crate) fn dom(err: wasm_bindgen::JsValue) -> Self {
        Self::Dom(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
    }
}
