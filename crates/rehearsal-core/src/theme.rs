pub const THEME_STORAGE_KEY: &str = "theme";
pub const THEME_ATTRIBUTE: &str = "theme";
pub const TRANSITIONS_CLASS: &str =
  "enable-transitions";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Theme {
  Light,
  Dark
}

impl Theme {
  pub fn from_storage(
    raw: &str
  ) -> Option<Self> {
    match raw {
      | "light" => Some(Self::Light),
      | "dark" => Some(Self::Dark),
      | _ => None
    }
  }

  pub fn from_system(
    prefers_dark: bool
  ) -> Self {
    if prefers_dark {
      Self::Dark
    } else {
      Self::Light
    }
  }

  /// Stored preference first, system preference otherwise.
  pub fn resolve_initial(
    stored: Option<&str>,
    system_prefers_dark: bool
  ) -> Self {
    stored
      .and_then(Self::from_storage)
      .unwrap_or_else(|| {
        Self::from_system(
          system_prefers_dark
        )
      })
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Light => "light",
      | Self::Dark => "dark"
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      | Self::Light => Self::Dark,
      | Self::Dark => Self::Light
    }
  }

  /// Material icon name for the mode the toggle switches to.
  pub fn toggle_icon(
    self
  ) -> &'static str {
    match self {
      | Self::Light => "dark_mode",
      | Self::Dark => "light_mode"
    }
  }
}
