use rehearsal_shared::{
  BandId,
  SaveRequest,
  Schedule
};
use tracing::{
  debug,
  info,
  trace
};

use crate::autosave::{
  Autosave,
  RetryPolicy,
  SaveOutcome,
  SaveStatus,
  SaveTicket,
  TickDecision
};
use crate::config::{
  GridConfig,
  StatusLabels
};
use crate::grid::{
  BulkToggle,
  Grid,
  GridCell,
  GridLine
};

/// A request the caller must send, paired with the ticket to report
/// back through [`ScheduleGridController::finish_save`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
  pub ticket:  SaveTicket,
  pub request: SaveRequest
}

/// Owns the availability grid of one page and its autosave state.
#[derive(Debug)]
pub struct ScheduleGridController<C> {
  grid:     Grid<C>,
  autosave: Autosave,
  labels:   StatusLabels,
  comment:  Option<String>
}

impl<C: GridCell>
  ScheduleGridController<C>
{
  /// `comment` is `Some` only on pages that render a comment field; it
  /// holds the field's initial value.
  pub fn new(
    cells: Vec<C>,
    config: &GridConfig,
    comment: Option<String>
  ) -> Self {
    info!(
      cells = cells.len(),
      has_comment = comment.is_some(),
      "schedule grid controller ready"
    );
    Self {
      grid: Grid::new(cells),
      autosave: Autosave::new(
        RetryPolicy::from(&config.autosave)
      ),
      labels: config.labels.clone(),
      comment
    }
  }

  pub fn grid(&self) -> &Grid<C> {
    &self.grid
  }

  pub fn is_dirty(&self) -> bool {
    self.autosave.is_dirty()
  }

  pub fn status(&self) -> &SaveStatus {
    self.autosave.status()
  }

  pub fn status_text(
    &self
  ) -> Option<&str> {
    self.autosave.status().label(&self.labels)
  }

  /// Leaving the page drops unsaved edits, so callers should ask first.
  pub fn needs_leave_confirmation(
    &self
  ) -> bool {
    self.autosave.is_dirty()
  }

  pub fn collect_schedule(
    &self
  ) -> Schedule {
    self.grid.collect_schedule()
  }

  /// A checkbox was flipped directly by the user.
  pub fn cell_changed(&mut self) {
    self.autosave.mark_dirty();
  }

  /// Ignored on pages without a comment field.
  pub fn comment_changed(
    &mut self,
    text: String
  ) {
    match self.comment.as_mut() {
      | Some(comment) => {
        *comment = text;
        self.autosave.mark_dirty();
      }
      | None => {
        debug!(
          "comment input on page without \
           comment field"
        );
      }
    }
  }

  pub fn toggle_line(
    &mut self,
    line: GridLine
  ) -> BulkToggle {
    let outcome =
      self.grid.toggle_line(line);
    if outcome.changed > 0 {
      self.autosave.mark_dirty();
    }
    outcome
  }

  /// Returns how many cells were overwritten.
  pub fn apply_default(
    &mut self,
    defaults: &Schedule
  ) -> usize {
    let changed =
      self.grid.apply_default(defaults);
    info!(
      changed,
      days = defaults.len(),
      "applied default schedule"
    );
    if changed > 0 {
      self.autosave.mark_dirty();
    }
    changed
  }

  /// Timer tick. Yields a request to send only when dirty, idle and
  /// outside any retry back-off window.
  pub fn begin_save(
    &mut self,
    band_id: BandId
  ) -> Option<PendingSave> {
    match self.autosave.tick() {
      | TickDecision::Save(ticket) => {
        let request = SaveRequest {
          band_id,
          schedule: self.collect_schedule(),
          comment: self.comment.clone()
        };
        debug!(
          seq = ticket.seq(),
          %band_id,
          days = request.schedule.len(),
          "built save request"
        );
        Some(PendingSave {
          ticket,
          request
        })
      }
      | decision => {
        trace!(?decision, "no save this tick");
        None
      }
    }
  }

  /// Returns the new status, or `None` when the response was stale.
  pub fn finish_save(
    &mut self,
    ticket: SaveTicket,
    outcome: SaveOutcome
  ) -> Option<&SaveStatus> {
    self.autosave.complete(ticket, outcome)
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::autosave::SaveFailure;
  use crate::grid::{
    CellKey,
    MemoryCell
  };

  fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
      .expect("valid date")
  }

  fn controller(
    comment: Option<String>
  ) -> ScheduleGridController<MemoryCell>
  {
    let cells = (0..3)
      .map(|hour| {
        MemoryCell::new(
          CellKey::new(date(), hour)
            .expect("valid key"),
          false
        )
      })
      .collect();
    ScheduleGridController::new(
      cells,
      &GridConfig::default(),
      comment
    )
  }

  #[test]
  fn single_edit_marks_changed_then_saved(
  ) {
    let mut ctl = controller(None);
    assert_eq!(ctl.status_text(), None);

    ctl.grid().cells()[1].set_checked(true);
    ctl.cell_changed();
    assert!(ctl.is_dirty());
    assert_eq!(
      ctl.status_text(),
      Some("変更あり")
    );

    let pending = ctl
      .begin_save(BandId(4))
      .expect("dirty controller saves");
    assert_eq!(
      ctl.status_text(),
      Some("保存中...")
    );
    assert_eq!(pending.request.comment, None);
    assert!(
      pending
        .request
        .schedule
        .is_available(date(), 1)
    );

    ctl.finish_save(
      pending.ticket,
      SaveOutcome::Saved
    );
    assert!(!ctl.is_dirty());
    assert_eq!(
      ctl.status_text(),
      Some("保存済み")
    );
    assert!(ctl.begin_save(BandId(4)).is_none());
  }

  #[test]
  fn failed_save_retries_same_payload() {
    let mut ctl = controller(None);
    ctl.toggle_line(GridLine::Date(date()));

    let first = ctl
      .begin_save(BandId(1))
      .expect("first attempt");
    ctl.finish_save(
      first.ticket,
      SaveOutcome::Failed(
        SaveFailure::Rejected { status: 502 }
      )
    );
    assert!(ctl.is_dirty());
    assert_eq!(
      ctl.status_text(),
      Some("保存に失敗しました")
    );

    let retry = ctl
      .begin_save(BandId(1))
      .expect("retried next tick");
    assert_eq!(
      retry.request,
      first.request
    );
  }

  #[test]
  fn comment_rides_along_when_present() {
    let mut ctl =
      controller(Some(String::new()));
    ctl.comment_changed(
      "late on friday".to_string()
    );
    assert!(ctl.is_dirty());

    let pending = ctl
      .begin_save(BandId(2))
      .expect("comment edit saves");
    assert_eq!(
      pending.request.comment.as_deref(),
      Some("late on friday")
    );
  }

  #[test]
  fn comment_ignored_without_field() {
    let mut ctl = controller(None);
    ctl.comment_changed("x".to_string());
    assert!(!ctl.is_dirty());
  }

  #[test]
  fn noop_toggle_and_default_stay_clean() {
    let mut ctl = controller(None);
    let toggle =
      ctl.toggle_line(GridLine::Hour(9));
    assert_eq!(toggle.changed, 0);
    assert_eq!(
      ctl.apply_default(&Schedule::new()),
      0
    );
    assert!(!ctl.is_dirty());
    assert!(!ctl.needs_leave_confirmation());
  }
}
