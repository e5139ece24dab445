use rehearsal_core::{
  CellKey,
  GridCell
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlInputElement,
  HtmlTextAreaElement,
  NodeList
};

pub const HIGHLIGHT_CLASS: &str =
  "cell-highlight";
const CELL_CONTAINER: &str = ".schedule-cell";

pub fn js_error(err: &JsValue) -> String {
  err
    .as_string()
    .unwrap_or_else(|| format!("{err:?}"))
}

/// `querySelectorAll` over the whole document, collected into elements.
pub fn query_all(
  document: &Document,
  selector: &str
) -> Result<Vec<Element>, JsValue> {
  Ok(collect_elements(
    &document.query_selector_all(selector)?
  ))
}

fn collect_elements(
  list: &NodeList
) -> Vec<Element> {
  (0..list.length())
    .filter_map(|index| list.item(index))
    .filter_map(|node| {
      node.dyn_into::<Element>().ok()
    })
    .collect()
}

/// Current text of an `<input>` or `<textarea>`.
pub fn field_value(
  element: &Element
) -> String {
  if let Some(area) =
    element.dyn_ref::<HtmlTextAreaElement>()
  {
    return area.value();
  }
  element
    .dyn_ref::<HtmlInputElement>()
    .map(HtmlInputElement::value)
    .unwrap_or_default()
}

pub fn navigate(url: &str) {
  tracing::info!(%url, "navigating");
  if let Err(err) = gloo::utils::window()
    .location()
    .set_href(url)
  {
    tracing::error!(
      %url,
      error = %js_error(&err),
      "navigation failed"
    );
  }
}

/// An availability checkbox bound to its `data-date`/`data-hour` key.
#[derive(Debug, Clone)]
pub struct DomCell {
  input: HtmlInputElement,
  key:   CellKey
}

impl DomCell {
  /// Skips (with a warning) inputs whose key attributes do not parse.
  pub fn bind(
    element: Element
  ) -> Option<Self> {
    let date = element
      .get_attribute("data-date")
      .unwrap_or_default();
    let hour = element
      .get_attribute("data-hour")
      .unwrap_or_default();

    let key =
      match CellKey::parse(&date, &hour) {
        | Ok(key) => key,
        | Err(error) => {
          tracing::warn!(
            error = %format!("{error:#}"),
            "skipping schedule checkbox"
          );
          return None;
        }
      };

    let input = element
      .dyn_into::<HtmlInputElement>()
      .ok()?;
    Some(Self { input, key })
  }

  pub fn input(
    &self
  ) -> &HtmlInputElement {
    &self.input
  }

  /// The `.schedule-cell` that carries highlight styling.
  pub fn container(
    &self
  ) -> Option<Element> {
    self
      .input
      .closest(CELL_CONTAINER)
      .ok()
      .flatten()
  }
}

impl GridCell for DomCell {
  fn key(&self) -> CellKey {
    self.key
  }

  fn is_checked(&self) -> bool {
    self.input.checked()
  }

  fn set_checked(&self, checked: bool) {
    self.input.set_checked(checked);
  }
}
