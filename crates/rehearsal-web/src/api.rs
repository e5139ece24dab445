use gloo::net::http::Request;
use rehearsal_core::{
  SaveFailure,
  SaveOutcome
};
use rehearsal_shared::{
  SaveRequest,
  Schedule
};

/// POSTs the grid snapshot. Any 2xx counts as saved.
pub async fn post_save(
  endpoint: &str,
  payload: &SaveRequest
) -> SaveOutcome {
  let request =
    match Request::post(endpoint)
      .json(payload)
    {
      | Ok(request) => request,
      | Err(e) => {
        return SaveOutcome::Failed(
          SaveFailure::Network(format!(
            "failed to encode save body: {e}"
          ))
        );
      }
    };

  match request.send().await {
    | Ok(response) => {
      SaveOutcome::from_status(
        response.status()
      )
    }
    | Err(e) => {
      SaveOutcome::Failed(
        SaveFailure::Network(format!(
          "request error: {e}"
        ))
      )
    }
  }
}

pub async fn fetch_default_schedule(
  endpoint: &str
) -> Result<Schedule, String> {
  let response = Request::get(endpoint)
    .send()
    .await
    .map_err(|e| {
      format!("request error: {e}")
    })?;

  if !response.ok() {
    return Err(format!(
      "server returned {}",
      response.status()
    ));
  }

  let body =
    response.text().await.map_err(|e| {
      format!("read error: {e}")
    })?;
  serde_json::from_str(&body)
    .map_err(|e| format!("decode error: {e}"))
}
