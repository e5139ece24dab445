mod api;
mod bands;
mod dom;
mod schedule;
mod scroll;
mod theme;
mod tooltip;

use std::rc::Rc;

use gloo::events::EventListener;
use rehearsal_core::GridConfig;
use wasm_bindgen::JsValue;
use web_sys::Document;

const GRID_CONFIG_TOML: &str =
  include_str!("../assets/grid.toml");

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting rehearsal grid frontend"
  );

  let config = Rc::new(
    GridConfig::load_or_default(
      GRID_CONFIG_TOML
    )
  );
  let document = gloo::utils::document();

  if document.ready_state() == "loading" {
    EventListener::once(
      &document,
      "DOMContentLoaded",
      move |_| {
        boot(
          &gloo::utils::document(),
          &config
        )
      }
    )
    .forget();
  } else {
    boot(&document, &config);
  }
}

fn boot(
  document: &Document,
  config: &Rc<GridConfig>
) {
  report(
    "theme",
    theme::install(document)
  );
  report(
    "schedule grid",
    schedule::install(document, config)
  );
  report(
    "member tooltip",
    tooltip::install(document)
  );
  report(
    "band list",
    bands::install(document, config)
  );
  report(
    "table scroll",
    scroll::install(document)
  );
}

fn report(
  feature: &str,
  result: Result<(), JsValue>
) {
  if let Err(err) = result {
    tracing::error!(
      feature,
      error = %dom::js_error(&err),
      "page feature setup failed"
    );
  }
}
