use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "consilium";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info")
}

/// Tunable parameters for the extraction pipeline.
///
/// Everything latency- or behavior-bearing is bound here once and flows
/// into the components at construction: extractors never read the
/// environment themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the reasoning service (Ollama-compatible).
    pub oracle_base_url: String,
    /// Model name passed on every generate call.
    pub oracle_model: String,
    /// Per-call timeout; a timed-out call degrades like unparseable output.
    pub oracle_timeout_secs: u64,
    /// How many drug suggestions to request per context extraction.
    pub suggestion_top_n: usize,
    /// Upper bound on the stored suggestion list after merging.
    pub suggestion_cap: usize,
    /// Fraction of the reference-range width treated as "borderline" near
    /// either boundary.
    pub band_fraction: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            oracle_base_url: "http://localhost:11434".to_string(),
            oracle_model: "medgemma".to_string(),
            oracle_timeout_secs: 120,
            suggestion_top_n: 8,
            suggestion_cap: 15,
            band_fraction: 0.075,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `CONSILIUM_*` environment variables.
    /// Unparseable values are ignored rather than fatal.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("CONSILIUM_ORACLE_URL") {
            if !url.trim().is_empty() {
                config.oracle_base_url = url.trim().to_string();
            }
        }
        if let Ok(model) = std::env::var("CONSILIUM_ORACLE_MODEL") {
            if !model.trim().is_empty() {
                config.oracle_model = model.trim().to_string();
            }
        }
        if let Some(secs) = env_parse::<u64>("CONSILIUM_ORACLE_TIMEOUT_SECS") {
            if secs > 0 {
                config.oracle_timeout_secs = secs;
            }
        }
        if let Some(top_n) = env_parse::<usize>("CONSILIUM_SUGGESTION_TOP_N") {
            if top_n > 0 {
                config.suggestion_top_n = top_n;
            }
        }
        if let Some(fraction) = env_parse::<f64>("CONSILIUM_BAND_FRACTION") {
            if fraction.is_finite() && fraction > 0.0 && fraction < 0.5 {
                config.band_fraction = fraction;
            }
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = PipelineConfig::default();
        assert_eq!(config.oracle_base_url, "http://localhost:11434");
        assert_eq!(config.suggestion_top_n, 8);
        assert_eq!(config.suggestion_cap, 15);
        assert!((config.band_fraction - 0.075).abs() < f64::EPSILON);
    }

    #[test]
    fn app_name_is_consilium() {
        assert_eq!(APP_NAME, "consilium");
    }

    #[test]
    fn default_filter_scopes_to_crate() {
        assert_eq!(default_log_filter(), "consilium=info");
    }

    #[test]
    fn config_serializes_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.oracle_model, config.oracle_model);
        assert_eq!(back.oracle_timeout_secs, config.oracle_timeout_secs);
    }
}
