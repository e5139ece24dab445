//! Dirty tracking and the periodic save loop.
//!
//! The loop is driven by an external interval timer calling
//! [`Autosave::tick`]. At most one save is in flight; its result is
//! matched back by [`SaveTicket`] so late responses cannot clobber
//! newer state. A request still unanswered after
//! `request_timeout_ticks` ticks is abandoned and counted as a network
//! failure.

use tracing::{
  debug,
  info,
  warn
};

use crate::config::{
  AutosaveConfig,
  StatusLabels
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct RetryPolicy {
  pub max_backoff_ticks:     u32,
  pub max_attempts:          Option<u32>,
  pub request_timeout_ticks: u32
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self::from(&AutosaveConfig::default())
  }
}

impl From<&AutosaveConfig> for RetryPolicy {
  fn from(config: &AutosaveConfig) -> Self {
    Self {
      max_backoff_ticks:     config
        .max_backoff_ticks
        .max(1),
      max_attempts:          config.max_attempts,
      request_timeout_ticks: config
        .request_timeout_ticks
        .max(1)
    }
  }
}

impl RetryPolicy {
  /// Ticks to wait before the next attempt after `failures`
  /// consecutive failures: 1, 2, 4, ... capped at `max_backoff_ticks`.
  pub fn delay_ticks(
    &self,
    failures: u32
  ) -> u32 {
    if failures == 0 {
      return 0;
    }
    let exp = (failures - 1).min(31);
    (1u32 << exp)
      .min(self.max_backoff_ticks.max(1))
  }

  pub fn exhausted(
    &self,
    failures: u32
  ) -> bool {
    self
      .max_attempts
      .is_some_and(|cap| failures >= cap)
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum SaveFailure {
  /// The server answered with a non-2xx status.
  Rejected { status: u16 },
  /// The request never completed.
  Network(String)
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum SaveOutcome {
  Saved,
  Failed(SaveFailure)
}

impl SaveOutcome {
  pub fn from_status(status: u16) -> Self {
    if (200..300).contains(&status) {
      Self::Saved
    } else {
      Self::Failed(SaveFailure::Rejected {
        status
      })
    }
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum SaveStatus {
  /// Nothing has happened since the page was rendered.
  Unchanged,
  Changed,
  Saving,
  Saved,
  Failed(SaveFailure),
  GaveUp
}

impl SaveStatus {
  /// `None` leaves the server-rendered label in place.
  pub fn label<'a>(
    &self,
    labels: &'a StatusLabels
  ) -> Option<&'a str> {
    let text = match self {
      | Self::Unchanged => return None,
      | Self::Changed => &labels.changed,
      | Self::Saving => &labels.saving,
      | Self::Saved => &labels.saved,
      | Self::Failed(
        SaveFailure::Rejected { .. }
      ) => &labels.save_failed,
      | Self::Failed(
        SaveFailure::Network(_)
      ) => &labels.network_error,
      | Self::GaveUp => &labels.gave_up
    };
    Some(text.as_str())
  }
}

/// Identifies one save request.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct SaveTicket {
  seq:        u64,
  generation: u64
}

impl SaveTicket {
  pub fn seq(&self) -> u64 {
    self.seq
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum TickDecision {
  Clean,
  InFlight,
  BackingOff { remaining: u32 },
  GaveUp,
  /// The in-flight request was abandoned and recorded as a failure.
  TimedOut { seq: u64 },
  Save(SaveTicket)
}

#[derive(Debug, Clone)]
pub struct Autosave {
  policy:          RetryPolicy,
  dirty:           bool,
  generation:      u64,
  next_seq:        u64,
  in_flight:       Option<SaveTicket>,
  in_flight_ticks: u32,
  failures:        u32,
  wait_ticks:      u32,
  status:          SaveStatus
}

impl Autosave {
  pub fn new(policy: RetryPolicy) -> Self {
    Self {
      policy,
      dirty: false,
      generation: 0,
      next_seq: 1,
      in_flight: None,
      in_flight_ticks: 0,
      failures: 0,
      wait_ticks: 0,
      status: SaveStatus::Unchanged
    }
  }

  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  pub fn is_saving(&self) -> bool {
    self.in_flight.is_some()
  }

  pub fn status(&self) -> &SaveStatus {
    &self.status
  }

  pub fn consecutive_failures(
    &self
  ) -> u32 {
    self.failures
  }

  /// Records a local edit. A loop that gave up is re-armed.
  pub fn mark_dirty(
    &mut self
  ) -> &SaveStatus {
    self.dirty = true;
    self.generation += 1;
    if self.policy.exhausted(self.failures)
    {
      info!(
        failures = self.failures,
        "new edit re-arms autosave"
      );
      self.failures = 0;
      self.wait_ticks = 0;
    }
    self.status = SaveStatus::Changed;
    &self.status
  }

  /// Called on every timer tick. Only [`TickDecision::Save`] asks the
  /// caller to send a request.
  pub fn tick(&mut self) -> TickDecision {
    if !self.dirty {
      return TickDecision::Clean;
    }
    if let Some(ticket) = self.in_flight {
      self.in_flight_ticks += 1;
      if self.in_flight_ticks
        < self.policy.request_timeout_ticks
      {
        debug!(
          seq = ticket.seq,
          ticks = self.in_flight_ticks,
          "previous save still in flight; \
           skipping tick"
        );
        return TickDecision::InFlight;
      }
      warn!(
        seq = ticket.seq,
        ticks = self.in_flight_ticks,
        "save request timed out; abandoning"
      );
      self.in_flight = None;
      self.record_failure(
        SaveFailure::Network(
          "timeout".to_string()
        )
      );
      return TickDecision::TimedOut {
        seq: ticket.seq
      };
    }
    if self.policy.exhausted(self.failures)
    {
      return TickDecision::GaveUp;
    }
    if self.wait_ticks > 0 {
      self.wait_ticks -= 1;
      return TickDecision::BackingOff {
        remaining: self.wait_ticks
      };
    }

    let ticket = SaveTicket {
      seq:        self.next_seq,
      generation: self.generation
    };
    self.next_seq += 1;
    self.in_flight = Some(ticket);
    self.in_flight_ticks = 0;
    self.status = SaveStatus::Saving;
    debug!(
      seq = ticket.seq,
      generation = ticket.generation,
      "starting save"
    );
    TickDecision::Save(ticket)
  }

  /// Applies the result of a save. Returns `None` for a ticket that is
  /// no longer the one in flight.
  pub fn complete(
    &mut self,
    ticket: SaveTicket,
    outcome: SaveOutcome
  ) -> Option<&SaveStatus> {
    if self.in_flight != Some(ticket) {
      warn!(
        seq = ticket.seq,
        "ignoring stale save response"
      );
      return None;
    }
    self.in_flight = None;

    match outcome {
      | SaveOutcome::Saved => {
        self.failures = 0;
        self.wait_ticks = 0;
        if self.generation
          == ticket.generation
        {
          self.dirty = false;
          self.status = SaveStatus::Saved;
        } else {
          debug!(
            seq = ticket.seq,
            "edits arrived during save; \
             staying dirty"
          );
          self.status = SaveStatus::Changed;
        }
      }
      | SaveOutcome::Failed(failure) => {
        self.record_failure(failure)
      }
    }
    Some(&self.status)
  }

  fn record_failure(
    &mut self,
    failure: SaveFailure
  ) {
    self.failures += 1;
    if self.policy.exhausted(self.failures) {
      warn!(
        failures = self.failures,
        ?failure,
        "giving up on autosave until the \
         next edit"
      );
      self.status = SaveStatus::GaveUp;
    } else {
      self.wait_ticks = self
        .policy
        .delay_ticks(self.failures)
        .saturating_sub(1);
      warn!(
        failures = self.failures,
        wait_ticks = self.wait_ticks,
        ?failure,
        "save failed; will retry"
      );
      self.status =
        SaveStatus::Failed(failure);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rejected() -> SaveOutcome {
    SaveOutcome::Failed(
      SaveFailure::Rejected { status: 500 }
    )
  }

  fn expect_save(
    autosave: &mut Autosave
  ) -> SaveTicket {
    match autosave.tick() {
      | TickDecision::Save(ticket) => ticket,
      | other => {
        panic!("expected save, got {other:?}")
      }
    }
  }

  /// Counts ticks until the loop asks for a save.
  fn ticks_until_save(
    autosave: &mut Autosave
  ) -> u32 {
    for n in 1..=64 {
      if let TickDecision::Save(_) =
        autosave.tick()
      {
        return n;
      }
    }
    panic!("no save within 64 ticks")
  }

  #[test]
  fn clean_loop_never_saves() {
    let mut autosave =
      Autosave::new(RetryPolicy::default());
    assert_eq!(
      autosave.tick(),
      TickDecision::Clean
    );
    assert_eq!(
      autosave.status(),
      &SaveStatus::Unchanged
    );
  }

  #[test]
  fn success_clears_dirty() {
    let mut autosave =
      Autosave::new(RetryPolicy::default());
    autosave.mark_dirty();
    let ticket = expect_save(&mut autosave);
    assert_eq!(
      autosave.status(),
      &SaveStatus::Saving
    );

    autosave
      .complete(ticket, SaveOutcome::Saved)
      .expect("current ticket");
    assert!(!autosave.is_dirty());
    assert_eq!(
      autosave.status(),
      &SaveStatus::Saved
    );
    assert_eq!(
      autosave.tick(),
      TickDecision::Clean
    );
  }

  #[test]
  fn in_flight_save_blocks_next_tick() {
    let mut autosave =
      Autosave::new(RetryPolicy::default());
    autosave.mark_dirty();
    expect_save(&mut autosave);
    assert_eq!(
      autosave.tick(),
      TickDecision::InFlight
    );
  }

  #[test]
  fn edit_during_save_keeps_dirty() {
    let mut autosave =
      Autosave::new(RetryPolicy::default());
    autosave.mark_dirty();
    let ticket = expect_save(&mut autosave);
    autosave.mark_dirty();

    autosave
      .complete(ticket, SaveOutcome::Saved)
      .expect("current ticket");
    assert!(autosave.is_dirty());
    assert_eq!(
      autosave.status(),
      &SaveStatus::Changed
    );
    expect_save(&mut autosave);
  }

  #[test]
  fn stale_ticket_is_ignored() {
    let mut autosave =
      Autosave::new(RetryPolicy::default());
    autosave.mark_dirty();
    let first = expect_save(&mut autosave);
    autosave
      .complete(first, rejected())
      .expect("current ticket");

    let second = expect_save(&mut autosave);
    assert_ne!(first.seq(), second.seq());

    assert!(
      autosave
        .complete(first, SaveOutcome::Saved)
        .is_none()
    );
    assert!(autosave.is_dirty());
    assert!(autosave.is_saving());
  }

  #[test]
  fn failure_keeps_dirty_and_retries_next_tick(
  ) {
    let mut autosave =
      Autosave::new(RetryPolicy::default());
    autosave.mark_dirty();
    let ticket = expect_save(&mut autosave);
    autosave
      .complete(ticket, rejected())
      .expect("current ticket");

    assert!(autosave.is_dirty());
    assert_eq!(
      autosave.status(),
      &SaveStatus::Failed(
        SaveFailure::Rejected { status: 500 }
      )
    );
    assert_eq!(
      ticks_until_save(&mut autosave),
      1
    );
  }

  #[test]
  fn backoff_doubles_up_to_cap() {
    let mut autosave =
      Autosave::new(RetryPolicy {
        max_backoff_ticks: 8,
        ..RetryPolicy::default()
      });
    autosave.mark_dirty();
    let mut ticket =
      expect_save(&mut autosave);

    let mut waits = vec![];
    for _ in 0..5 {
      autosave
        .complete(ticket, rejected())
        .expect("current ticket");
      let wait =
        ticks_until_save(&mut autosave);
      waits.push(wait);
      ticket = autosave
        .in_flight
        .expect("save started");
    }
    assert_eq!(waits, vec![1, 2, 4, 8, 8]);
  }

  #[test]
  fn attempt_cap_stops_until_next_edit() {
    let mut autosave =
      Autosave::new(RetryPolicy {
        max_backoff_ticks: 1,
        max_attempts: Some(2),
        ..RetryPolicy::default()
      });
    autosave.mark_dirty();

    for _ in 0..2 {
      let ticket =
        expect_save(&mut autosave);
      autosave.complete(
        ticket,
        SaveOutcome::Failed(
          SaveFailure::Network(
            "offline".to_string()
          )
        )
      );
    }

    assert_eq!(
      autosave.status(),
      &SaveStatus::GaveUp
    );
    assert_eq!(
      autosave.tick(),
      TickDecision::GaveUp
    );

    autosave.mark_dirty();
    assert_eq!(
      autosave.consecutive_failures(),
      0
    );
    expect_save(&mut autosave);
  }

  #[test]
  fn unanswered_request_times_out_and_retries(
  ) {
    let mut autosave =
      Autosave::new(RetryPolicy {
        request_timeout_ticks: 3,
        ..RetryPolicy::default()
      });
    autosave.mark_dirty();
    let hung = expect_save(&mut autosave);

    for _ in 0..2 {
      autosave.mark_dirty();
      assert_eq!(
        autosave.tick(),
        TickDecision::InFlight
      );
    }
    assert_eq!(
      autosave.tick(),
      TickDecision::TimedOut {
        seq: hung.seq()
      }
    );
    assert!(!autosave.is_saving());
    assert_eq!(
      autosave.consecutive_failures(),
      1
    );
    assert_eq!(
      autosave.status(),
      &SaveStatus::Failed(
        SaveFailure::Network(
          "timeout".to_string()
        )
      )
    );

    let retry = expect_save(&mut autosave);
    assert_ne!(retry.seq(), hung.seq());
    assert!(
      autosave
        .complete(hung, SaveOutcome::Saved)
        .is_none()
    );
    assert!(autosave.is_saving());

    autosave
      .complete(retry, SaveOutcome::Saved)
      .expect("current ticket");
    assert!(!autosave.is_dirty());
  }

  #[test]
  fn timeouts_count_toward_attempt_cap() {
    let mut autosave =
      Autosave::new(RetryPolicy {
        max_attempts: Some(1),
        request_timeout_ticks: 1,
        ..RetryPolicy::default()
      });
    autosave.mark_dirty();
    let hung = expect_save(&mut autosave);
    assert_eq!(
      autosave.tick(),
      TickDecision::TimedOut {
        seq: hung.seq()
      }
    );
    assert_eq!(
      autosave.status(),
      &SaveStatus::GaveUp
    );
    assert_eq!(
      autosave.tick(),
      TickDecision::GaveUp
    );
  }

  #[test]
  fn status_codes_map_to_outcomes() {
    assert_eq!(
      SaveOutcome::from_status(204),
      SaveOutcome::Saved
    );
    assert_eq!(
      SaveOutcome::from_status(403),
      rejected_with(403)
    );
  }

  fn rejected_with(
    status: u16
  ) -> SaveOutcome {
    SaveOutcome::Failed(
      SaveFailure::Rejected { status }
    )
  }

  #[test]
  fn labels_follow_failure_kind() {
    let labels = StatusLabels::default();
    assert_eq!(
      SaveStatus::Unchanged.label(&labels),
      None
    );
    assert_eq!(
      SaveStatus::Failed(
        SaveFailure::Rejected { status: 500 }
      )
      .label(&labels),
      Some("保存に失敗しました")
    );
    assert_eq!(
      SaveStatus::Failed(
        SaveFailure::Network(String::new())
      )
      .label(&labels),
      Some("エラーが発生しました")
    );
  }
}
