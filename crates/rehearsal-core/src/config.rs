use anyhow::Context;
use serde::Deserialize;
use tracing::{
  error,
  info,
  warn
};

pub const MIN_INTERVAL_SECS: u32 = 1;
pub const MAX_INTERVAL_SECS: u32 = 60;

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Default,
  Deserialize,
)]
#[serde(default)]
pub struct GridConfig {
  pub autosave:  AutosaveConfig,
  pub labels:    StatusLabels,
  pub highlight: HighlightConfig,
  pub clipboard: ClipboardConfig,
  pub dialogs:   DialogTexts
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Deserialize,
)]
#[serde(default)]
pub struct AutosaveConfig {
  pub interval_secs:         u32,
  pub max_backoff_ticks:     u32,
  pub max_attempts:          Option<u32>,
  /// Ticks an unanswered save may stay in flight before it is abandoned.
  pub request_timeout_ticks: u32
}

impl Default for AutosaveConfig {
  fn default() -> Self {
    Self {
      interval_secs:         default_interval_secs(),
      max_backoff_ticks:     default_max_backoff_ticks(),
      max_attempts:          None,
      request_timeout_ticks: default_request_timeout_ticks()
    }
  }
}

impl AutosaveConfig {
  pub fn interval_ms(&self) -> u32 {
    self.interval_secs.saturating_mul(1_000)
  }
}

/// Text written into `#save-status`.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Deserialize,
)]
#[serde(default)]
pub struct StatusLabels {
  pub changed:       String,
  pub saving:        String,
  pub saved:         String,
  pub save_failed:   String,
  pub network_error: String,
  pub gave_up:       String
}

impl Default for StatusLabels {
  fn default() -> Self {
    Self {
      changed:       "変更あり".to_string(),
      saving:        "保存中...".to_string(),
      saved:         "保存済み".to_string(),
      save_failed:   "保存に失敗しました"
        .to_string(),
      network_error: "エラーが発生しました"
        .to_string(),
      gave_up:       "保存を中断しました"
        .to_string()
    }
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Deserialize,
)]
#[serde(default)]
pub struct HighlightConfig {
  pub duration_ms: u32
}

impl Default for HighlightConfig {
  fn default() -> Self {
    Self {
      duration_ms: default_highlight_ms()
    }
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Deserialize,
)]
#[serde(default)]
pub struct ClipboardConfig {
  pub feedback_ms: u32,
  pub restore_ms:  u32,
  pub copied_text: String,
  pub failed_text: String
}

impl Default for ClipboardConfig {
  fn default() -> Self {
    Self {
      feedback_ms: default_feedback_ms(),
      restore_ms:  default_restore_ms(),
      copied_text: "コピーしました！"
        .to_string(),
      failed_text: "コピーに失敗しました"
        .to_string()
    }
  }
}

/// Messages for `confirm()` / `alert()` prompts.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Deserialize,
)]
#[serde(default)]
pub struct DialogTexts {
  pub apply_default_confirm: String,
  pub apply_default_failed:  String,
  pub unsaved_leave_confirm: String,
  pub delete_band_confirm:   String
}

impl Default for DialogTexts {
  fn default() -> Self {
    Self {
      apply_default_confirm:
        "現在のチェック状態が、デフォルトのスケジュールで上書きされます。よろしいですか？"
          .to_string(),
      apply_default_failed:
        "デフォルトのスケジュールの適用に失敗しました。"
          .to_string(),
      unsaved_leave_confirm:
        "保存されていない変更があります。移動してもよろしいですか？"
          .to_string(),
      delete_band_confirm:
        "本当にこのバンドを削除しますか？\nこの操作は元に戻せません。"
          .to_string()
    }
  }
}

fn default_interval_secs() -> u32 {
  3
}

fn default_max_backoff_ticks() -> u32 {
  8
}

fn default_request_timeout_ticks() -> u32 {
  10
}

fn default_highlight_ms() -> u32 {
  300
}

fn default_feedback_ms() -> u32 {
  2_000
}

fn default_restore_ms() -> u32 {
  300
}

impl GridConfig {
  /// Parses and sanitizes a TOML document. Missing keys take defaults.
  #[tracing::instrument(skip(raw))]
  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut config =
      toml::from_str::<GridConfig>(raw)
        .context(
          "failed to parse grid config"
        )?;
    config.sanitize();
    Ok(config)
  }

  /// Like [`GridConfig::from_toml_str`] but never fails; a broken
  /// document is logged and replaced with defaults.
  pub fn load_or_default(
    raw: &str
  ) -> Self {
    match Self::from_toml_str(raw) {
      | Ok(config) => {
        info!(
          interval_secs = config
            .autosave
            .interval_secs,
          max_backoff_ticks = config
            .autosave
            .max_backoff_ticks,
          max_attempts = ?config
            .autosave
            .max_attempts,
          request_timeout_ticks = config
            .autosave
            .request_timeout_ticks,
          "loaded grid config"
        );
        config
      }
      | Err(error) => {
        error!(
          error = %format!("{error:#}"),
          "failed loading grid config; \
           using defaults"
        );
        GridConfig::default()
      }
    }
  }

  fn sanitize(&mut self) {
    let interval =
      self.autosave.interval_secs;
    let clamped = interval.clamp(
      MIN_INTERVAL_SECS,
      MAX_INTERVAL_SECS
    );
    if clamped != interval {
      warn!(
        interval,
        clamped,
        "autosave interval out of range"
      );
      self.autosave.interval_secs =
        clamped;
    }

    if self.autosave.max_backoff_ticks
      == 0
    {
      warn!(
        "max_backoff_ticks must be \
         positive; using default"
      );
      self.autosave.max_backoff_ticks =
        default_max_backoff_ticks();
    }

    if self.autosave.max_attempts
      == Some(0)
    {
      warn!(
        "max_attempts = 0 would never \
         save; removing cap"
      );
      self.autosave.max_attempts = None;
    }

    if self.autosave.request_timeout_ticks
      == 0
    {
      warn!(
        "request_timeout_ticks must be \
         positive; using default"
      );
      self.autosave.request_timeout_ticks =
        default_request_timeout_ticks();
    }

    if self.highlight.duration_ms == 0 {
      self.highlight.duration_ms =
        default_highlight_ms();
    }

    if self.clipboard.feedback_ms == 0 {
      self.clipboard.feedback_ms =
        default_feedback_ms();
    }

    if self.clipboard.restore_ms == 0 {
      self.clipboard.restore_ms =
        default_restore_ms();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let config =
      GridConfig::from_toml_str("")
        .expect("parse empty config");
    assert_eq!(
      config,
      GridConfig::default()
    );
    assert_eq!(
      config.autosave.interval_ms(),
      3_000
    );
    assert_eq!(
      config.labels.saved,
      "保存済み"
    );
  }

  #[test]
  fn partial_tables_keep_other_defaults() {
    let config = GridConfig::from_toml_str(
      r#"
        [autosave]
        interval_secs = 5
        max_attempts = 10

        [labels]
        saved = "Saved"
      "#
    )
    .expect("parse config");

    assert_eq!(
      config.autosave.interval_secs,
      5
    );
    assert_eq!(
      config.autosave.max_attempts,
      Some(10)
    );
    assert_eq!(
      config.autosave.max_backoff_ticks,
      8
    );
    assert_eq!(config.labels.saved, "Saved");
    assert_eq!(
      config.labels.changed,
      "変更あり"
    );
  }

  #[test]
  fn dialog_texts_can_be_overridden() {
    let config = GridConfig::from_toml_str(
      "[dialogs]\ndelete_band_confirm = \"Delete?\"\n"
    )
    .expect("parse config");
    assert_eq!(
      config.dialogs.delete_band_confirm,
      "Delete?"
    );
    assert!(
      config
        .dialogs
        .apply_default_confirm
        .contains("デフォルト")
    );
  }

  #[test]
  fn out_of_range_values_are_sanitized() {
    let config = GridConfig::from_toml_str(
      r#"
        [autosave]
        interval_secs = 0
        max_backoff_ticks = 0
        max_attempts = 0
        request_timeout_ticks = 0

        [highlight]
        duration_ms = 0
      "#
    )
    .expect("parse config");

    assert_eq!(
      config.autosave.interval_secs,
      MIN_INTERVAL_SECS
    );
    assert_eq!(
      config.autosave.max_backoff_ticks,
      8
    );
    assert_eq!(
      config.autosave.max_attempts,
      None
    );
    assert_eq!(
      config.autosave.request_timeout_ticks,
      10
    );
    assert_eq!(
      config.highlight.duration_ms,
      300
    );

    let slow = GridConfig::from_toml_str(
      "[autosave]\ninterval_secs = 600\n"
    )
    .expect("parse config");
    assert_eq!(
      slow.autosave.interval_secs,
      MAX_INTERVAL_SECS
    );
  }

  #[test]
  fn malformed_document_falls_back() {
    assert!(
      GridConfig::from_toml_str(
        "[autosave\n"
      )
      .is_err()
    );
    assert_eq!(
      GridConfig::load_or_default(
        "[autosave]\ninterval_secs = \"fast\"\n"
      ),
      GridConfig::default()
    );
  }
}
