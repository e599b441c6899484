use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::TokenTotals;

use super::cache::{get_cache_path, load_cache, save_cache};
use super::provider::fetch_litellm_raw;
use super::resolver::{bundled_pricing, convert_litellm, default_pricing, normalize_model_name};
use super::types::{ModelPricing, PricingSource};

/// Decimal places kept on computed costs
const COST_SCALE: u32 = 6;

/// Immutable rate table, built once at startup and shared by reference
#[derive(Debug, Clone)]
pub(crate) struct PricingDb {
    models: HashMap<String, ModelPricing>,
    source: PricingSource,
}

impl PricingDb {
    pub(crate) fn bundled() -> Self {
        Self {
            models: bundled_pricing(),
            source: PricingSource::Bundled,
        }
    }

    /// Layer `models` over the bundled table so families missing upstream still resolve.
    fn layered(models: HashMap<String, ModelPricing>, source: PricingSource) -> Self {
        let mut merged = bundled_pricing();
        merged.extend(models);
        Self {
            models: merged,
            source,
        }
    }

    /// Three-tier resolution: fetch (unless offline), then the on-disk cache, then bundled.
    pub(crate) fn load(offline: bool) -> Self {
        let cache_path = get_cache_path();
        Self::resolve(offline, cache_path.as_deref(), fetch_litellm_raw, Utc::now())
    }

    pub(crate) fn resolve<F>(
        offline: bool,
        cache_path: Option<&Path>,
        fetch: F,
        now: DateTime<Utc>,
    ) -> Self
    where
        F: FnOnce() -> Option<Map<String, Value>>,
    {
        let start = Instant::now();

        if !offline {
            let fetched = fetch().map(|raw| convert_litellm(&raw));
            match fetched {
                Some(models) if !models.is_empty() => {
                    if let Some(path) = cache_path
                        && let Err(err) = save_cache(path, &models, now)
                    {
                        warn!(path = %path.display(), %err, "failed to write pricing cache");
                    }
                    info!(
                        models = models.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "using pricing fetched from LiteLLM"
                    );
                    return Self::layered(models, PricingSource::Fetched);
                }
                Some(_) => warn!("LiteLLM price sheet had no Claude models"),
                None => warn!("could not fetch LiteLLM pricing"),
            }
        }

        if let Some(path) = cache_path
            && let Some(models) = load_cache(path, now)
        {
            info!(models = models.len(), path = %path.display(), "using cached pricing");
            return Self::layered(models, PricingSource::Cache);
        }

        info!("using bundled pricing");
        Self::bundled()
    }

    pub(crate) fn source(&self) -> PricingSource {
        self.source
    }

    /// Rates for a model id as written in logs, or the default rate.
    pub(crate) fn get_pricing(&self, model: &str) -> ModelPricing {
        self.models
            .get(&normalize_model_name(model))
            .copied()
            .unwrap_or_else(default_pricing)
    }

    /// Cost of `tokens` at `model`'s rate, rounded to 6 decimal places.
    pub(crate) fn calculate_cost(&self, tokens: &TokenTotals, model: &str) -> Decimal {
        let pricing = self.get_pricing(model);
        let cost = Decimal::from(tokens.input_tokens) * pricing.input
            + Decimal::from(tokens.output_tokens) * pricing.output
            + Decimal::from(tokens.cache_creation_tokens) * pricing.cache_creation
            + Decimal::from(tokens.cache_read_tokens) * pricing.cache_read;
        cost.round_dp(COST_SCALE)
    }
}
