use std::cell::Cell;

use anyhow::{
  Context,
  anyhow
};
use chrono::NaiveDate;
use rehearsal_shared::{
  HOURS_PER_DAY,
  Schedule
};
use tracing::debug;

/// Lookup key carried by every availability checkbox.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
)]
pub struct CellKey {
  pub date: NaiveDate,
  pub hour: usize
}

impl CellKey {
  pub fn new(
    date: NaiveDate,
    hour: usize
  ) -> anyhow::Result<Self> {
    if hour >= HOURS_PER_DAY {
      return Err(anyhow!(
        "hour {hour} is outside 0..{HOURS_PER_DAY}"
      ));
    }
    Ok(Self { date, hour })
  }

  /// Parses the raw `data-date` / `data-hour` attribute pair.
  pub fn parse(
    date: &str,
    hour: &str
  ) -> anyhow::Result<Self> {
    let parsed_date =
      NaiveDate::parse_from_str(
        date.trim(),
        "%Y-%m-%d"
      )
      .with_context(|| {
        format!(
          "invalid cell date {date:?}"
        )
      })?;
    let parsed_hour = hour
      .trim()
      .parse::<usize>()
      .with_context(|| {
        format!(
          "invalid cell hour {hour:?}"
        )
      })?;
    Self::new(parsed_date, parsed_hour)
  }
}

/// A checkbox in the availability grid.
///
/// Writes go through `&self` because the backing store (a DOM input)
/// is shared and mutated in place.
pub trait GridCell {
  fn key(&self) -> CellKey;
  fn is_checked(&self) -> bool;
  fn set_checked(&self, checked: bool);
}

/// A cell that keeps its state in memory.
#[derive(Debug, Clone)]
pub struct MemoryCell {
  key:     CellKey,
  checked: Cell<bool>
}

impl MemoryCell {
  pub fn new(
    key: CellKey,
    checked: bool
  ) -> Self {
    Self {
      key,
      checked: Cell::new(checked)
    }
  }
}

impl GridCell for MemoryCell {
  fn key(&self) -> CellKey {
    self.key
  }

  fn is_checked(&self) -> bool {
    self.checked.get()
  }

  fn set_checked(&self, checked: bool) {
    self.checked.set(checked);
  }
}

/// A column (one date) or a row (one hour) of the grid.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum GridLine {
  Date(NaiveDate),
  Hour(usize)
}

impl GridLine {
  pub fn contains(
    &self,
    key: CellKey
  ) -> bool {
    match *self {
      | Self::Date(date) => {
        key.date == date
      }
      | Self::Hour(hour) => {
        key.hour == hour
      }
    }
  }
}

/// Result of a bulk row/column toggle.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct BulkToggle {
  pub target:   bool,
  pub changed:  usize,
  /// Indices of every cell in the line, changed or not.
  pub affected: Vec<usize>
}

#[derive(Debug)]
pub struct Grid<C> {
  cells: Vec<C>
}

impl<C: GridCell> Grid<C> {
  pub fn new(cells: Vec<C>) -> Self {
    Self { cells }
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn cells(&self) -> &[C] {
    &self.cells
  }

  pub fn cell(
    &self,
    index: usize
  ) -> Option<&C> {
    self.cells.get(index)
  }

  /// Snapshot of the current checkbox states.
  pub fn collect_schedule(
    &self
  ) -> Schedule {
    let mut schedule = Schedule::new();
    for cell in &self.cells {
      let key = cell.key();
      schedule
        .day_mut(key.date)
        .set(key.hour, cell.is_checked());
    }
    schedule
  }

  /// Checks every cell of `line` unless all are already checked, in
  /// which case every cell is cleared.
  pub fn toggle_line(
    &self,
    line: GridLine
  ) -> BulkToggle {
    let affected: Vec<usize> = self
      .cells
      .iter()
      .enumerate()
      .filter(|(_, cell)| {
        line.contains(cell.key())
      })
      .map(|(index, _)| index)
      .collect();

    let target = !affected.iter().all(
      |&index| {
        self.cells[index].is_checked()
      }
    );

    let mut changed = 0;
    for &index in &affected {
      let cell = &self.cells[index];
      if cell.is_checked() != target {
        cell.set_checked(target);
        changed += 1;
      }
    }

    debug!(
      ?line,
      target,
      changed,
      cells = affected.len(),
      "bulk toggle"
    );

    BulkToggle {
      target,
      changed,
      affected
    }
  }

  /// Overwrites every cell that disagrees with `defaults`. Returns the
  /// number of cells written.
  pub fn apply_default(
    &self,
    defaults: &Schedule
  ) -> usize {
    let mut changed = 0;
    for cell in &self.cells {
      let key = cell.key();
      let wanted = defaults
        .is_available(key.date, key.hour);
      if cell.is_checked() != wanted {
        cell.set_checked(wanted);
        changed += 1;
      }
    }
    changed
  }
}
