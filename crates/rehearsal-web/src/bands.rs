//! Band list page: card navigation, invite-link copy buttons and the
//! delete confirmation.

use std::rc::Rc;

use gloo::events::{
  EventListener,
  EventListenerOptions
};
use gloo::timers::callback::Timeout;
use rehearsal_core::GridConfig;
use rehearsal_core::clipboard::{
  FeedbackPlan,
  FeedbackStyle,
  feedback_plan
};
use rehearsal_core::navigation::band_card_url;
use wasm_bindgen::{
  JsCast,
  JsValue
};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
  Document,
  Element,
  HtmlElement,
  HtmlInputElement
};

use crate::dom;

const ACTIONS_SELECTOR: &str = ".band-actions";

pub fn install(
  document: &Document,
  config: &Rc<GridConfig>
) -> Result<(), JsValue> {
  bind_cards(document)?;
  bind_copy_buttons(document, config)?;
  bind_delete_form(document, config);
  Ok(())
}

/// Closest ancestor of the event target matching `selector`.
fn target_closest(
  event: &web_sys::Event,
  selector: &str
) -> Option<Element> {
  event
    .target()?
    .dyn_into::<Element>()
    .ok()?
    .closest(selector)
    .ok()
    .flatten()
}

fn bind_cards(
  document: &Document
) -> Result<(), JsValue> {
  for card in
    dom::query_all(document, ".band-card")?
  {
    let token = card
      .get_attribute("data-token")
      .unwrap_or_default();
    EventListener::new(
      &card,
      "click",
      move |event| {
        if target_closest(
          event,
          ACTIONS_SELECTOR
        )
        .is_some()
        {
          return;
        }
        let encoded = String::from(
          js_sys::encode_uri_component(
            &token
          )
        );
        if let Some(url) =
          band_card_url(&encoded)
        {
          dom::navigate(&url);
        }
      }
    )
    .forget();
  }
  Ok(())
}

fn bind_copy_buttons(
  document: &Document,
  config: &Rc<GridConfig>
) -> Result<(), JsValue> {
  for button in
    dom::query_all(document, ".copy-btn")?
  {
    let config = Rc::clone(config);
    EventListener::new(
      &button,
      "click",
      move |event| {
        let Some(actions) = target_closest(
          event,
          ACTIONS_SELECTOR
        ) else {
          return;
        };
        let input = actions
          .query_selector(
            "input[type=\"text\"]"
          )
          .ok()
          .flatten()
          .and_then(|el| {
            el.dyn_into::<HtmlInputElement>()
              .ok()
          });
        let feedback = actions
          .query_selector(".copy-feedback")
          .ok()
          .flatten()
          .and_then(|el| {
            el.dyn_into::<HtmlElement>().ok()
          });
        let (Some(input), Some(feedback)) =
          (input, feedback)
        else {
          return;
        };

        let promise = gloo::utils::window()
          .navigator()
          .clipboard()
          .write_text(&input.value());
        let config = Rc::clone(&config);
        wasm_bindgen_futures::spawn_local(
          async move {
            let copied =
              match JsFuture::from(promise)
                .await
              {
                | Ok(_) => true,
                | Err(err) => {
                  tracing::error!(
                    error = %dom::js_error(&err),
                    "failed copying band url"
                  );
                  false
                }
              };
            show_feedback(
              &feedback,
              feedback_plan(
                copied,
                &config.clipboard
              )
            );
          }
        );
      }
    )
    .forget();
  }
  Ok(())
}

fn set_style(
  element: &HtmlElement,
  style: FeedbackStyle
) {
  let css = element.style();
  let _ = css.set_property("color", style.color);
  let _ = css.set_property(
    "background-color",
    style.background
  );
}

fn show_feedback(
  element: &HtmlElement,
  plan: FeedbackPlan
) {
  element.set_text_content(Some(&plan.text));
  if let Some(style) = plan.style {
    set_style(element, style);
  }
  let _ = element
    .style()
    .set_property("opacity", "1");

  let element = element.clone();
  Timeout::new(plan.hide_after_ms, move || {
    let _ = element
      .style()
      .set_property("opacity", "0");
    if let Some((delay_ms, style)) =
      plan.restore
    {
      Timeout::new(delay_ms, move || {
        set_style(&element, style);
      })
      .forget();
    }
  })
  .forget();
}

fn bind_delete_form(
  document: &Document,
  config: &Rc<GridConfig>
) {
  let Some(form) = document
    .get_element_by_id("delete-band-form")
  else {
    return;
  };

  let config = Rc::clone(config);
  EventListener::new_with_options(
    &form,
    "submit",
    EventListenerOptions::enable_prevent_default(),
    move |event| {
      if !gloo::dialogs::confirm(
        &config.dialogs.delete_band_confirm
      ) {
        tracing::info!(
          "band deletion canceled"
        );
        event.prevent_default();
      }
    }
  )
  .forget();
}
