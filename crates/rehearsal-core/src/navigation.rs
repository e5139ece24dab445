use rehearsal_shared::BandId;

/// First path segment of a grid page, e.g. `schedule-manage`.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct PageRoute {
  segment: String
}

impl PageRoute {
  pub fn from_pathname(
    pathname: &str
  ) -> Option<Self> {
    pathname
      .split('/')
      .find(|part| !part.is_empty())
      .map(|segment| Self {
        segment: segment.to_string()
      })
  }

  pub fn segment(&self) -> &str {
    &self.segment
  }

  pub fn save_endpoint(&self) -> String {
    format!("/{}/save", self.segment)
  }

  pub fn default_schedule_endpoint(
    &self
  ) -> String {
    format!(
      "/{}/default-schedule",
      self.segment
    )
  }

  pub fn band_url(
    &self,
    band_id: BandId
  ) -> String {
    format!(
      "/{}?band_id={band_id}",
      self.segment
    )
  }
}

/// Link target of a band card. `encoded_token` must already be
/// URI-component encoded.
pub fn band_card_url(
  encoded_token: &str
) -> Option<String> {
  if encoded_token.is_empty() {
    return None;
  }
  Some(format!(
    "/band?token={encoded_token}"
  ))
}
