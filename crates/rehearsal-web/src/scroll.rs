use gloo::events::EventListener;
use rehearsal_core::scroll::{
  SCROLLED_CLASS,
  TodayColumn,
  date_header_selector,
  is_scrolled,
  today_scroll_left
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlElement
};

fn sync_scrolled_class(
  wrapper: &Element,
  table: &Element
) {
  let scrolled = is_scrolled(f64::from(
    wrapper.scroll_left()
  ));
  let classes = table.class_list();
  let _ = if scrolled {
    classes.add_1(SCROLLED_CLASS)
  } else {
    classes.remove_1(SCROLLED_CLASS)
  };
}

fn html_element(
  document: &Document,
  selector: &str
) -> Option<HtmlElement> {
  document
    .query_selector(selector)
    .ok()
    .flatten()
    .and_then(|el| {
      el.dyn_into::<HtmlElement>().ok()
    })
}

fn scroll_to_today(
  document: &Document,
  wrapper: &Element
) {
  let today =
    chrono::Local::now().date_naive();
  let (Some(header), Some(corner)) = (
    html_element(
      document,
      &date_header_selector(today)
    ),
    html_element(document, ".corner-cell")
  ) else {
    return;
  };

  let left = today_scroll_left(TodayColumn {
    header_left:  f64::from(
      header.offset_left()
    ),
    header_width: f64::from(
      header.offset_width()
    ),
    corner_width: f64::from(
      corner.offset_width()
    )
  });
  tracing::debug!(
    %today,
    left,
    "scrolling to today's column"
  );
  wrapper.set_scroll_left(left as _);
}

pub fn install(
  document: &Document
) -> Result<(), JsValue> {
  let Some(wrapper) =
    document.query_selector(".table-wrapper")?
  else {
    return Ok(());
  };

  if let Some(table) =
    wrapper.query_selector(".schedule-table")?
  {
    sync_scrolled_class(&wrapper, &table);
    let source = wrapper.clone();
    EventListener::new(
      &wrapper,
      "scroll",
      move |_| {
        sync_scrolled_class(&source, &table)
      }
    )
    .forget();
  }

  scroll_to_today(document, &wrapper);
  Ok(())
}
