pub mod autosave;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod grid;
pub mod navigation;
pub mod scroll;
pub mod theme;
pub mod tooltip;

pub use autosave::{
  Autosave,
  RetryPolicy,
  SaveFailure,
  SaveOutcome,
  SaveStatus,
  SaveTicket,
  TickDecision
};
pub use config::GridConfig;
pub use controller::{
  PendingSave,
  ScheduleGridController
};
pub use grid::{
  BulkToggle,
  CellKey,
  Grid,
  GridCell,
  GridLine,
  MemoryCell
};
pub use rehearsal_shared::{
  BandId,
  DayAvailability,
  HOURS_PER_DAY,
  SaveRequest,
  Schedule
};
