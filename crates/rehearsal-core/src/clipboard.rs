use crate::config::ClipboardConfig;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct FeedbackStyle {
  pub color:      &'static str,
  pub background: &'static str
}

pub const BASE_STYLE: FeedbackStyle =
  FeedbackStyle {
    color:      "#fff",
    background: "#2c3e50"
  };

pub const ERROR_STYLE: FeedbackStyle =
  FeedbackStyle {
    color:      "#fff",
    background: "#e74c3c"
  };

/// What the copy-feedback element should do after a copy attempt.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct FeedbackPlan {
  pub text:          String,
  /// Applied immediately, together with full opacity.
  pub style:         Option<FeedbackStyle>,
  pub hide_after_ms: u32,
  /// Style restored this long after hiding.
  pub restore:       Option<(
    u32,
    FeedbackStyle
  )>
}

pub fn feedback_plan(
  copied: bool,
  config: &ClipboardConfig
) -> FeedbackPlan {
  if copied {
    FeedbackPlan {
      text:          config.copied_text.clone(),
      style:         None,
      hide_after_ms: config.feedback_ms,
      restore:       None
    }
  } else {
    FeedbackPlan {
      text:          config.failed_text.clone(),
      style:         Some(ERROR_STYLE),
      hide_after_ms: config.feedback_ms,
      restore:       Some((
        config.restore_ms,
        BASE_STYLE
      ))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn success_only_shows_text() {
    let plan = feedback_plan(
      true,
      &ClipboardConfig::default()
    );
    assert_eq!(plan.text, "コピーしました！");
    assert_eq!(plan.style, None);
    assert_eq!(plan.hide_after_ms, 2_000);
    assert_eq!(plan.restore, None);
  }

  #[test]
  fn failure_flashes_error_then_restores()
  {
    let plan = feedback_plan(
      false,
      &ClipboardConfig::default()
    );
    assert_eq!(
      plan.text,
      "コピーに失敗しました"
    );
    assert_eq!(
      plan.style,
      Some(ERROR_STYLE)
    );
    assert_eq!(
      plan.restore,
      Some((300, BASE_STYLE))
    );
  }
}
