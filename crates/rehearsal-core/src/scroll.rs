use chrono::NaiveDate;

pub const SCROLLED_CLASS: &str = "is-scrolled";

/// Share of a column width left visible before today's column.
const TODAY_OFFSET_FACTOR: f64 = 0.8;

pub fn is_scrolled(scroll_left: f64) -> bool {
  scroll_left > 0.0
}

/// Layout numbers read off the rendered table, in CSS pixels.
#[derive(
  Debug, Clone, Copy, PartialEq,
)]
pub struct TodayColumn {
  pub header_left:  f64,
  pub header_width: f64,
  pub corner_width: f64
}

/// `scrollLeft` that puts today's column just right of the sticky
/// hour labels.
pub fn today_scroll_left(
  column: TodayColumn
) -> f64 {
  let target = column.header_left
    - column.corner_width
    - column.header_width
      * TODAY_OFFSET_FACTOR;
  target.max(0.0)
}

pub fn date_header_selector(
  date: NaiveDate
) -> String {
  format!(
    ".date-header[data-date=\"{}\"]",
    date.format("%Y-%m-%d")
  )
}
