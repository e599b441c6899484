use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

const LITELLM_PRICING_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_RETRIES: usize = 3;
const RETRY_BACKOFF_MS: u64 = 250;
const USER_AGENT: &str = concat!("cctop/", env!("CARGO_PKG_VERSION"));

/// Download the raw LiteLLM price sheet, retrying with linear backoff.
pub(super) fn fetch_litellm_raw() -> Option<Map<String, Value>> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(FETCH_TIMEOUT))
        .build()
        .into();

    for attempt in 0..FETCH_RETRIES {
        match agent
            .get(LITELLM_PRICING_URL)
            .header("User-Agent", USER_AGENT)
            .call()
        {
            Ok(response) => {
                let mut body = response.into_body();
                match serde_json::from_reader(body.as_reader()) {
                    Ok(parsed) => return Some(parsed),
                    Err(err) => debug!(attempt, %err, "price sheet is not valid JSON"),
                }
            }
            Err(err) => debug!(attempt, %err, "price sheet request failed"),
        }

        if attempt + 1 < FETCH_RETRIES {
            std::thread::sleep(Duration::from_millis(
                RETRY_BACKOFF_MS * (attempt as u64 + 1),
            ));
        }
    }

    None
}
