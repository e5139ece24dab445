//! Binds the availability grid on `/schedule-manage` and
//! `/band-practice` to a [`ScheduleGridController`].

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use gloo::events::EventListener;
use gloo::timers::callback::{
  Interval,
  Timeout
};
use rehearsal_core::navigation::PageRoute;
use rehearsal_core::{
  BandId,
  GridConfig,
  GridLine,
  SaveOutcome,
  ScheduleGridController
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlSelectElement
};

use crate::api;
use crate::dom::{
  self,
  DomCell,
  HIGHLIGHT_CLASS
};

/// `#band-selector`, bound on every page that renders one.
struct BandSelector {
  element: HtmlSelectElement,
  current: Option<BandId>,
  /// Last unparsable value, so it is reported once.
  invalid: RefCell<Option<String>>
}

impl BandSelector {
  fn find(
    document: &Document
  ) -> Option<Self> {
    let element = document
      .get_element_by_id("band-selector")?
      .dyn_into::<HtmlSelectElement>()
      .ok()?;
    let mut selector = Self {
      element,
      current: None,
      invalid: RefCell::new(None)
    };
    selector.current = selector.selected();
    Some(selector)
  }

  fn selected(&self) -> Option<BandId> {
    let raw = self.element.value();
    match raw.parse::<BandId>() {
      | Ok(band_id) => {
        *self.invalid.borrow_mut() = None;
        Some(band_id)
      }
      | Err(error) => {
        let mut invalid =
          self.invalid.borrow_mut();
        if invalid.as_deref()
          != Some(raw.as_str())
        {
          tracing::warn!(
            value = %raw,
            %error,
            "band selector value is not \
             a band id; saves paused"
          );
          *invalid = Some(raw);
        }
        None
      }
    }
  }

  fn restore(&self) {
    if let Some(current) = self.current {
      self
        .element
        .set_value(&current.to_string());
    }
  }
}

struct GridPage {
  controller: RefCell<
    ScheduleGridController<DomCell>
  >,
  status:     Option<Element>,
  selector:   Option<Rc<BandSelector>>,
  route:      PageRoute,
  config:     Rc<GridConfig>
}

impl GridPage {
  fn render_status(&self) {
    let Some(status) = &self.status else {
      return;
    };
    if let Some(text) =
      self.controller.borrow().status_text()
    {
      status.set_text_content(Some(text));
    }
  }
}

#[tracing::instrument(skip_all)]
pub fn install(
  document: &Document,
  config: &Rc<GridConfig>
) -> Result<(), JsValue> {
  let pathname = gloo::utils::window()
    .location()
    .pathname()?;
  let Some(route) =
    PageRoute::from_pathname(&pathname)
  else {
    tracing::warn!(
      %pathname,
      "cannot derive page route"
    );
    return Ok(());
  };
  let selector =
    BandSelector::find(document).map(Rc::new);

  let inputs = dom::query_all(
    document,
    ".schedule-checkbox"
  )?;
  let page = if inputs.is_empty() {
    tracing::debug!(
      "no schedule checkboxes; grid is \
       read-only"
    );
    None
  } else {
    Some(bind_grid(
      document,
      config,
      inputs,
      route.clone(),
      selector.clone()
    )?)
  };

  match selector {
    | Some(selector) => {
      bind_band_selector(
        selector,
        route,
        page,
        config
      )
    }
    | None if page.is_some() => {
      tracing::warn!(
        "band selector missing; saves are \
         disabled"
      )
    }
    | None => {}
  }
  Ok(())
}

fn bind_grid(
  document: &Document,
  config: &Rc<GridConfig>,
  inputs: Vec<Element>,
  route: PageRoute,
  selector: Option<Rc<BandSelector>>
) -> Result<Rc<GridPage>, JsValue> {
  let cells: Vec<DomCell> = inputs
    .into_iter()
    .filter_map(DomCell::bind)
    .collect();

  let comment_field =
    document.get_element_by_id("comment-input");
  let initial_comment = comment_field
    .as_ref()
    .map(dom::field_value);

  let page = Rc::new(GridPage {
    controller: RefCell::new(
      ScheduleGridController::new(
        cells,
        config,
        initial_comment
      )
    ),
    status: document
      .get_element_by_id("save-status"),
    selector,
    route,
    config: Rc::clone(config)
  });

  bind_checkboxes(&page);
  if let Some(field) = comment_field {
    bind_comment(&page, &field);
  }
  bind_lines(document, &page)?;
  bind_apply_default(document, &page);
  start_autosave(&page);

  tracing::info!(
    route = page.route.segment(),
    band = ?page
      .selector
      .as_ref()
      .and_then(|selector| selector.current),
    "schedule grid bound"
  );
  Ok(page)
}

fn bind_checkboxes(page: &Rc<GridPage>) {
  let inputs: Vec<_> = page
    .controller
    .borrow()
    .grid()
    .cells()
    .iter()
    .map(|cell| cell.input().clone())
    .collect();

  for input in inputs {
    let page = Rc::clone(page);
    EventListener::new(
      &input,
      "change",
      move |_| {
        page
          .controller
          .borrow_mut()
          .cell_changed();
        page.render_status();
      }
    )
    .forget();
  }
}

fn bind_comment(
  page: &Rc<GridPage>,
  field: &Element
) {
  let page = Rc::clone(page);
  let source = field.clone();
  EventListener::new(
    field,
    "input",
    move |_| {
      page
        .controller
        .borrow_mut()
        .comment_changed(dom::field_value(
          &source
        ));
      page.render_status();
    }
  )
  .forget();
}

fn bind_lines(
  document: &Document,
  page: &Rc<GridPage>
) -> Result<(), JsValue> {
  for header in
    dom::query_all(document, ".date-header")?
  {
    let raw = header
      .get_attribute("data-date")
      .unwrap_or_default();
    match NaiveDate::parse_from_str(
      &raw, "%Y-%m-%d"
    ) {
      | Ok(date) => {
        bind_line(
          page,
          &header,
          GridLine::Date(date)
        )
      }
      | Err(error) => {
        tracing::warn!(
          date = %raw,
          %error,
          "skipping date header"
        )
      }
    }
  }

  for label in
    dom::query_all(document, ".time-label")?
  {
    let raw = label
      .get_attribute("data-hour")
      .unwrap_or_default();
    match raw.trim().parse::<usize>() {
      | Ok(hour) => {
        bind_line(
          page,
          &label,
          GridLine::Hour(hour)
        )
      }
      | Err(error) => {
        tracing::warn!(
          hour = %raw,
          %error,
          "skipping time label"
        )
      }
    }
  }
  Ok(())
}

fn bind_line(
  page: &Rc<GridPage>,
  trigger: &Element,
  line: GridLine
) {
  let page = Rc::clone(page);
  EventListener::new(
    trigger,
    "click",
    move |_| {
      let highlighted: Vec<Element> = {
        let mut ctl =
          page.controller.borrow_mut();
        let outcome = ctl.toggle_line(line);
        outcome
          .affected
          .iter()
          .filter_map(|&index| {
            ctl.grid().cell(index)
          })
          .filter_map(DomCell::container)
          .collect()
      };
      page.render_status();

      for cell in &highlighted {
        let _ = cell
          .class_list()
          .add_1(HIGHLIGHT_CLASS);
      }
      Timeout::new(
        page.config.highlight.duration_ms,
        move || {
          for cell in &highlighted {
            let _ = cell
              .class_list()
              .remove_1(HIGHLIGHT_CLASS);
          }
        }
      )
      .forget();
    }
  )
  .forget();
}

/// Navigates to the chosen band. With an editable grid holding unsaved
/// edits the user confirms first; declining restores the old choice.
fn bind_band_selector(
  selector: Rc<BandSelector>,
  route: PageRoute,
  page: Option<Rc<GridPage>>,
  config: &Rc<GridConfig>
) {
  let config = Rc::clone(config);
  let target = selector.element.clone();
  EventListener::new(
    &target,
    "change",
    move |_| {
      let Some(band_id) = selector.selected()
      else {
        return;
      };

      let dirty = page.as_ref().is_some_and(
        |page| {
          page
            .controller
            .borrow()
            .needs_leave_confirmation()
        }
      );
      if dirty
        && !gloo::dialogs::confirm(
          &config
            .dialogs
            .unsaved_leave_confirm
        )
      {
        tracing::info!(
          %band_id,
          "band switch canceled; unsaved \
           edits kept"
        );
        selector.restore();
        return;
      }

      dom::navigate(&route.band_url(band_id));
    }
  )
  .forget();
}

fn bind_apply_default(
  document: &Document,
  page: &Rc<GridPage>
) {
  let Some(button) = document
    .get_element_by_id("apply-default-btn")
  else {
    return;
  };

  let page = Rc::clone(page);
  EventListener::new(
    &button,
    "click",
    move |_| {
      if !gloo::dialogs::confirm(
        &page
          .config
          .dialogs
          .apply_default_confirm
      ) {
        return;
      }

      let page = Rc::clone(&page);
      wasm_bindgen_futures::spawn_local(
        async move {
          let endpoint = page
            .route
            .default_schedule_endpoint();
          match api::fetch_default_schedule(
            &endpoint
          )
          .await
          {
            | Ok(defaults) => {
              let changed = page
                .controller
                .borrow_mut()
                .apply_default(&defaults);
              if changed > 0 {
                page.render_status();
              }
            }
            | Err(error) => {
              tracing::error!(
                %endpoint,
                %error,
                "failed applying default \
                 schedule"
              );
              gloo::dialogs::alert(
                &page
                  .config
                  .dialogs
                  .apply_default_failed
              );
            }
          }
        }
      );
    }
  )
  .forget();
}

fn start_autosave(page: &Rc<GridPage>) {
  let interval_ms =
    page.config.autosave.interval_ms();
  let page = Rc::clone(page);
  Interval::new(interval_ms, move || {
    autosave_tick(&page)
  })
  .forget();
  tracing::debug!(
    interval_ms,
    "autosave timer started"
  );
}

fn autosave_tick(page: &Rc<GridPage>) {
  if !page.controller.borrow().is_dirty() {
    return;
  }
  let Some(band_id) = page
    .selector
    .as_ref()
    .and_then(|selector| selector.selected())
  else {
    return;
  };

  let pending = page
    .controller
    .borrow_mut()
    .begin_save(band_id);
  page.render_status();
  let Some(pending) = pending else {
    return;
  };

  let page = Rc::clone(page);
  wasm_bindgen_futures::spawn_local(
    async move {
      let endpoint =
        page.route.save_endpoint();
      let outcome = api::post_save(
        &endpoint,
        &pending.request
      )
      .await;

      match &outcome {
        | SaveOutcome::Saved => {
          tracing::debug!(
            seq = pending.ticket.seq(),
            "schedule saved"
          )
        }
        | SaveOutcome::Failed(failure) => {
          tracing::error!(
            seq = pending.ticket.seq(),
            %endpoint,
            ?failure,
            "error saving schedule"
          )
        }
      }

      let applied = page
        .controller
        .borrow_mut()
        .finish_save(pending.ticket, outcome)
        .is_some();
      if applied {
        page.render_status();
      }
    }
  );
}
