use gloo::events::EventListener;
use rehearsal_core::theme::{
  THEME_ATTRIBUTE,
  THEME_STORAGE_KEY,
  TRANSITIONS_CLASS,
  Theme
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  MediaQueryListEvent
};

const DARK_QUERY: &str =
  "(prefers-color-scheme: dark)";

fn load_stored_theme() -> Option<String> {
  gloo::utils::window()
    .local_storage()
    .ok()
    .flatten()
    .and_then(|storage| {
      storage
        .get_item(THEME_STORAGE_KEY)
        .ok()
        .flatten()
    })
}

fn save_theme(theme: Theme) {
  if let Some(storage) =
    gloo::utils::window()
      .local_storage()
      .ok()
      .flatten()
  {
    let _ = storage.set_item(
      THEME_STORAGE_KEY,
      theme.as_str()
    );
  }
}

/// Sets the root attribute and icon, and remembers the choice.
fn apply_theme(
  document: &Document,
  theme: Theme
) {
  if let Some(root) =
    document.document_element()
    && let Err(err) = root.set_attribute(
      THEME_ATTRIBUTE,
      theme.as_str()
    )
  {
    tracing::error!(
      error = %crate::dom::js_error(&err),
      "failed setting theme attribute"
    );
  }

  if let Some(icon) =
    document.get_element_by_id("mode-icon")
  {
    icon.set_text_content(Some(
      theme.toggle_icon()
    ));
  }

  save_theme(theme);
  tracing::debug!(
    theme = theme.as_str(),
    "applied theme"
  );
}

fn current_theme(
  document: &Document
) -> Theme {
  document
    .document_element()
    .and_then(|root| {
      root.get_attribute(THEME_ATTRIBUTE)
    })
    .and_then(|raw| {
      Theme::from_storage(&raw)
    })
    .unwrap_or(Theme::Light)
}

pub fn install(
  document: &Document
) -> Result<(), JsValue> {
  let media = gloo::utils::window()
    .match_media(DARK_QUERY)?;
  let prefers_dark = media
    .as_ref()
    .is_some_and(|query| query.matches());

  let stored = load_stored_theme();
  let initial = Theme::resolve_initial(
    stored.as_deref(),
    prefers_dark
  );
  tracing::info!(
    stored = ?stored,
    prefers_dark,
    theme = initial.as_str(),
    "resolved initial theme"
  );
  apply_theme(document, initial);

  if let Some(button) = document
    .get_element_by_id("theme-toggle-button")
  {
    let document = document.clone();
    EventListener::new(
      &button,
      "click",
      move |_| {
        if let Some(body) = document.body() {
          let _ = body
            .class_list()
            .add_1(TRANSITIONS_CLASS);
        }
        let next =
          current_theme(&document).toggled();
        apply_theme(&document, next);
      }
    )
    .forget();
  }

  if let Some(media) = media {
    let document = document.clone();
    EventListener::new(
      &media,
      "change",
      move |event| {
        let Some(change) = event
          .dyn_ref::<MediaQueryListEvent>()
        else {
          return;
        };
        apply_theme(
          &document,
          Theme::from_system(change.matches())
        );
      }
    )
    .forget();
  }

  Ok(())
}
