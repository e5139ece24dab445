pub const TOOLTIP_CLASS: &str =
  "schedule-tooltip";
pub const VISIBLE_CLASS: &str = "is-visible";
pub const MEMBER_CELL_SELECTOR: &str =
  ".schedule-table td[data-members]";

const OFFSET_PX: f64 = 10.0;

/// Splits a `data-members` attribute into display names.
pub fn parse_members(
  raw: &str
) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
  pub members: Vec<String>,
  pub left:    f64,
  pub top:     f64
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipAction {
  Show(TooltipContent),
  Hide,
  Nothing
}

/// Visibility state of the single shared tooltip.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq,
)]
pub struct Tooltip {
  visible: bool
}

impl Tooltip {
  pub fn is_visible(&self) -> bool {
    self.visible
  }

  pub fn hover(
    &mut self,
    members: &str,
    page_x: f64,
    page_y: f64
  ) -> TooltipAction {
    let members = parse_members(members);
    if members.is_empty() {
      return TooltipAction::Nothing;
    }
    self.visible = true;
    TooltipAction::Show(TooltipContent {
      members,
      left: page_x + OFFSET_PX,
      top: page_y + OFFSET_PX
    })
  }

  pub fn leave(&mut self) -> TooltipAction {
    self.visible = false;
    TooltipAction::Hide
  }

  /// Tap toggles, for touch screens without hover.
  pub fn click(
    &mut self,
    members: &str,
    page_x: f64,
    page_y: f64
  ) -> TooltipAction {
    if self.visible {
      self.leave()
    } else {
      self.hover(members, page_x, page_y)
    }
  }

  /// A click anywhere else on the page.
  pub fn outside_click(
    &mut self
  ) -> TooltipAction {
    if self.visible {
      self.leave()
    } else {
      TooltipAction::Nothing
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn members_are_trimmed_and_empties_dropped(
  ) {
    assert_eq!(
      parse_members(" Aki, ,Ren ,"),
      vec!["Aki", "Ren"]
    );
    assert!(parse_members("").is_empty());
  }

  #[test]
  fn hover_offsets_position() {
    let mut tooltip = Tooltip::default();
    let action =
      tooltip.hover("Aki", 100.0, 40.0);
    assert_eq!(
      action,
      TooltipAction::Show(TooltipContent {
        members: vec!["Aki".to_string()],
        left:    110.0,
        top:     50.0
      })
    );
    assert!(tooltip.is_visible());
  }

  #[test]
  fn empty_cell_shows_nothing() {
    let mut tooltip = Tooltip::default();
    assert_eq!(
      tooltip.hover("", 0.0, 0.0),
      TooltipAction::Nothing
    );
    assert!(!tooltip.is_visible());
  }

  #[test]
  fn click_toggles_and_outside_click_hides(
  ) {
    let mut tooltip = Tooltip::default();
    assert!(matches!(
      tooltip.click("Aki,Ren", 1.0, 1.0),
      TooltipAction::Show(_)
    ));
    assert_eq!(
      tooltip.click("Aki,Ren", 1.0, 1.0),
      TooltipAction::Hide
    );

    assert_eq!(
      tooltip.outside_click(),
      TooltipAction::Nothing
    );
    tooltip.hover("Aki", 0.0, 0.0);
    assert_eq!(
      tooltip.outside_click(),
      TooltipAction::Hide
    );
  }
}
