//! On-disk pricing cache: `{cache_dir}/cctop/pricing.json`

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::consts::APP_DIR;

use super::types::ModelPricing;

const CACHE_VERSION: &str = "1.0";
const CACHE_TTL_HOURS: f64 = 24.0;

fn default_ttl_hours() -> f64 {
    CACHE_TTL_HOURS
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile<P> {
    version: String,
    fetched_at: String,
    #[serde(default = "default_ttl_hours")]
    ttl_hours: f64,
    pricing: P,
}

pub(crate) fn get_cache_path() -> Option<PathBuf> {
    Some(dirs::cache_dir()?.join(APP_DIR).join("pricing.json"))
}

/// Rates from the cache if it is readable, well-formed and not yet expired.
pub(crate) fn load_cache(path: &Path, now: DateTime<Utc>) -> Option<HashMap<String, ModelPricing>> {
    let content = fs::read_to_string(path).ok()?;
    let cache: CacheFile<Map<String, Value>> = match serde_json::from_str(&content) {
        Ok(cache) => cache,
        Err(err) => {
            warn!(path = %path.display(), %err, "pricing cache is corrupt");
            return None;
        }
    };

    let fetched_at = DateTime::parse_from_rfc3339(&cache.fetched_at).ok()?;
    let ttl = TimeDelta::try_milliseconds((cache.ttl_hours * 3_600_000.0) as i64)?;
    let expires_at = fetched_at.with_timezone(&Utc).checked_add_signed(ttl)?;
    if now >= expires_at {
        debug!(fetched_at = %cache.fetched_at, "pricing cache expired");
        return None;
    }

    let mut models = HashMap::new();
    for (model, rates) in cache.pricing {
        match serde_json::from_value::<ModelPricing>(rates) {
            Ok(pricing) => {
                models.insert(model, pricing);
            }
            Err(err) => debug!(%model, %err, "skipping cached entry with bad rates"),
        }
    }

    if models.is_empty() {
        debug!("pricing cache has no usable entries");
        return None;
    }
    Some(models)
}

/// Write the cache through a temp file and rename, so readers never see a partial file.
pub(crate) fn save_cache(
    path: &Path,
    models: &HashMap<String, ModelPricing>,
    now: DateTime<Utc>,
) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let cache = CacheFile {
        version: CACHE_VERSION.to_string(),
        fetched_at: now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ttl_hours: CACHE_TTL_HOURS,
        pricing: models.iter().collect::<BTreeMap<_, _>>(),
    };
    let json = serde_json::to_string_pretty(&cache).map_err(io::Error::other)?;

    let temp = path.with_extension("tmp");
    fs::write(&temp, json)?;
    fs::rename(&temp, path)
}
