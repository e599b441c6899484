use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use super::types::ModelPricing;

/// Rates given in USD per million tokens
fn per_million(input: &str, output: &str, cache_creation: &str, cache_read: &str) -> ModelPricing {
    let rate = |s: &str| s.parse::<Decimal>().unwrap_or_default() / Decimal::from(1_000_000);
    ModelPricing {
        input: rate(input),
        output: rate(output),
        cache_creation: rate(cache_creation),
        cache_read: rate(cache_read),
    }
}

fn sonnet_pricing() -> ModelPricing {
    per_million("3", "15", "3.75", "0.3")
}

fn opus_pricing() -> ModelPricing {
    per_million("15", "75", "18.75", "1.5")
}

/// Rate for models the table does not know
pub(crate) fn default_pricing() -> ModelPricing {
    sonnet_pricing()
}

/// Offline table keyed by normalized family name
pub(crate) fn bundled_pricing() -> HashMap<String, ModelPricing> {
    [
        ("claude-sonnet-4-5", sonnet_pricing()),
        ("claude-opus-4-5", opus_pricing()),
        ("claude-3-5-sonnet", sonnet_pricing()),
        ("claude-3-opus", opus_pricing()),
        ("claude-3-5-haiku", per_million("0.8", "4", "1", "0.08")),
        ("claude-3-haiku", per_million("0.25", "1.25", "0.3", "0.03")),
    ]
    .into_iter()
    .map(|(name, pricing)| (name.to_string(), pricing))
    .collect()
}

/// Map a model id as written in logs to its pricing key; unknown ids pass through.
pub(crate) fn normalize_model_name(model: &str) -> String {
    let lower = model.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    let family = if has("opus-4") {
        "claude-opus-4-5"
    } else if has("sonnet-4") {
        "claude-sonnet-4-5"
    } else if has("3-5-sonnet") || has("3.5-sonnet") {
        "claude-3-5-sonnet"
    } else if has("3-opus") || has("3.0-opus") {
        "claude-3-opus"
    } else if has("3-5-haiku") || has("3.5-haiku") {
        "claude-3-5-haiku"
    } else if has("3-haiku") || has("3.0-haiku") {
        "claude-3-haiku"
    } else {
        return model.to_string();
    };
    family.to_string()
}

/// Family key for a LiteLLM model name such as
/// `anthropic.claude-3-5-sonnet-20241022-v2:0` or `bedrock/claude-3-haiku`.
fn litellm_family(name: &str) -> String {
    let lower = name
        .to_lowercase()
        .replace("anthropic.", "")
        .replace("bedrock/", "");
    let base = lower.split("-v").next().unwrap_or_default();
    let has = |needle: &str| base.contains(needle);

    let family = if has("opus-4") || (has("opus") && has("4.5")) {
        "claude-opus-4-5"
    } else if has("sonnet-4") || (has("sonnet") && has("4.5")) {
        "claude-sonnet-4-5"
    } else if has("3-5-sonnet") || has("3.5-sonnet") {
        "claude-3-5-sonnet"
    } else if has("3-opus") || (has("opus") && has("3") && !has("4")) {
        "claude-3-opus"
    } else if has("3-5-haiku") || has("3.5-haiku") || has("haiku-4") {
        "claude-3-5-haiku"
    } else if has("3-haiku") || (has("haiku") && has("3") && !has("4")) {
        "claude-3-haiku"
    } else {
        return base.to_string();
    };
    family.to_string()
}

fn rate(value: &Value, key: &str) -> Option<Decimal> {
    let raw = value.get(key)?.as_f64()?;
    // Through the shortest decimal string so 3e-06 becomes exactly 0.000003
    raw.to_string().parse().ok()
}

/// Convert a LiteLLM price sheet into family-keyed rates.
///
/// Only Claude/Anthropic entries with both input and output costs are kept;
/// the first entry seen for a family wins. Missing cache costs are zero.
pub(crate) fn convert_litellm(data: &Map<String, Value>) -> HashMap<String, ModelPricing> {
    let mut models = HashMap::new();

    for (name, value) in data {
        let lower = name.to_lowercase();
        if !lower.contains("claude") && !lower.contains("anthropic") {
            continue;
        }

        let (Some(input), Some(output)) = (
            rate(value, "input_cost_per_token"),
            rate(value, "output_cost_per_token"),
        ) else {
            debug!(model = %name, "skipping entry without input/output pricing");
            continue;
        };

        let pricing = ModelPricing {
            input,
            output,
            cache_creation: rate(value, "cache_creation_input_token_cost").unwrap_or_default(),
            cache_read: rate(value, "cache_read_input_token_cost").unwrap_or_default(),
        };

        models.entry(litellm_family(name)).or_insert(pricing);
    }

    models
}
