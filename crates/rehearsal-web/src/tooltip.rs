use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use rehearsal_core::tooltip::{
  MEMBER_CELL_SELECTOR,
  TOOLTIP_CLASS,
  Tooltip,
  TooltipAction,
  VISIBLE_CLASS
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlElement,
  MouseEvent
};

use crate::dom;

struct TooltipView {
  state:    RefCell<Tooltip>,
  element:  HtmlElement,
  document: Document
}

impl TooltipView {
  fn render(&self, action: TooltipAction) {
    if let Err(err) = self.try_render(action)
    {
      tracing::error!(
        error = %dom::js_error(&err),
        "failed rendering tooltip"
      );
    }
  }

  fn try_render(
    &self,
    action: TooltipAction
  ) -> Result<(), JsValue> {
    match action {
      | TooltipAction::Show(content) => {
        self.element.set_inner_html("");
        let list =
          self.document.create_element("ul")?;
        for name in &content.members {
          let item = self
            .document
            .create_element("li")?;
          item.set_text_content(Some(name));
          list.append_child(&item)?;
        }
        self.element.append_child(&list)?;

        let style = self.element.style();
        style.set_property(
          "left",
          &format!("{}px", content.left)
        )?;
        style.set_property(
          "top",
          &format!("{}px", content.top)
        )?;
        self
          .element
          .class_list()
          .add_1(VISIBLE_CLASS)
      }
      | TooltipAction::Hide => {
        self
          .element
          .class_list()
          .remove_1(VISIBLE_CLASS)
      }
      | TooltipAction::Nothing => Ok(())
    }
  }
}

fn members_of(cell: &Element) -> String {
  cell
    .get_attribute("data-members")
    .unwrap_or_default()
}

fn page_position(
  event: &web_sys::Event
) -> (f64, f64) {
  event
    .dyn_ref::<MouseEvent>()
    .map(|mouse| {
      (
        f64::from(mouse.page_x()),
        f64::from(mouse.page_y())
      )
    })
    .unwrap_or((0.0, 0.0))
}

pub fn install(
  document: &Document
) -> Result<(), JsValue> {
  let cells = dom::query_all(
    document,
    MEMBER_CELL_SELECTOR
  )?;
  if cells.is_empty() {
    return Ok(());
  }
  let Some(body) = document.body() else {
    return Ok(());
  };

  let element = document
    .create_element("div")?
    .dyn_into::<HtmlElement>()?;
  element.set_class_name(TOOLTIP_CLASS);
  body.append_child(&element)?;

  let view = Rc::new(TooltipView {
    state: RefCell::new(Tooltip::default()),
    element,
    document: document.clone()
  });

  for cell in &cells {
    let view_enter = Rc::clone(&view);
    let source = cell.clone();
    EventListener::new(
      cell,
      "mouseenter",
      move |event| {
        let (x, y) = page_position(event);
        let action =
          view_enter.state.borrow_mut().hover(
            &members_of(&source),
            x,
            y
          );
        view_enter.render(action);
      }
    )
    .forget();

    let view_leave = Rc::clone(&view);
    EventListener::new(
      cell,
      "mouseleave",
      move |_| {
        let action =
          view_leave.state.borrow_mut().leave();
        view_leave.render(action);
      }
    )
    .forget();

    let view_click = Rc::clone(&view);
    let source = cell.clone();
    EventListener::new(
      cell,
      "click",
      move |event| {
        let (x, y) = page_position(event);
        let action =
          view_click.state.borrow_mut().click(
            &members_of(&source),
            x,
            y
          );
        view_click.render(action);
        event.stop_propagation();
      }
    )
    .forget();
  }

  EventListener::new(
    &body,
    "click",
    move |_| {
      let action = view
        .state
        .borrow_mut()
        .outside_click();
      view.render(action);
    }
  )
  .forget();

  tracing::debug!(
    cells = cells.len(),
    "member tooltip bound"
  );
  Ok(())
}
