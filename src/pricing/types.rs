use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-token rates in USD (per token, not per million)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ModelPricing {
    pub(crate) input: Decimal,
    pub(crate) output: Decimal,
    pub(crate) cache_creation: Decimal,
    pub(crate) cache_read: Decimal,
}

/// Which tier the active pricing table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PricingSource {
    Fetched,
    Cache,
    Bundled,
}

impl PricingSource {
    pub(crate) fn label(self) -> &'static str {
        match self {
            PricingSource::Fetched => "LiteLLM",
            PricingSource::Cache => "cache",
            PricingSource::Bundled => "bundled",
        }
    }
}
