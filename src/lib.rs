pub mod config;
pub mod error;
pub mod flow;
pub mod navigator;
pub mod options;

#[cfg(target_arch = "wasm32")]
mod dom;

pub use config::PageConfig;
pub use error::{BindError, ConfigError};
pub use flow::FlowMode;
pub use navigator::{Navigator, Transition};
pub use options::{
    plan_hidden_fields, FieldEffect, FormState, GroupId, HiddenField, HiddenFieldPlan, OptionId,
    OptionRegistry, SelectionChange, SelectionMode,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_app() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    let document = match dom::document() {
        Ok(document) => document,
        Err(err) => {
            log::error!("Page wizard not started: {}", err);
            return;
        }
    };

    let config = PageConfig::load(dom::embedded_config(&document).as_deref());
    log::set_max_level(config.log_level().to_level_filter());

    match dom::mount(&document, &config) {
        Ok(page) => {
            log::debug!("{:?} flow ready", page.mode);
            page.forget();
        }
        Err(err) => log::error!("Page left as rendered: {}", err),
    }
}
