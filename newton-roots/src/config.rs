/// When the uniform seed scan runs after the recursive tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FallbackPolicy {
    #[default]
    Always,
    WhenEmpty,
    Never,
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Always => "always",
            Self::WhenEmpty => "when empty",
            Self::Never => "never",
        };
        write!(f, "{name}")
    }
}

/// Tunables of the root discovery phase.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub newton_iterations: usize,
    pub newton_tolerance: f64,
    pub derivative_threshold: f64,
    pub dedup_tolerance: f64,
    pub capacity: usize,
    pub integration_steps: usize,
    pub near_zero_threshold: f64,
    pub max_depth: usize,
    pub min_region_size: f64,
    pub grid_size: usize,
    pub residual_threshold: f64,
    pub fallback: FallbackPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            newton_iterations: 50,
            newton_tolerance: 1.0e-10,
            derivative_threshold: 1.0e-14,
            dedup_tolerance: 1.0e-5,
            capacity: 20,
            integration_steps: 100,
            near_zero_threshold: 1.0e-15,
            max_depth: 20,
            min_region_size: 1.0e-4,
            grid_size: 20,
            residual_threshold: 1.0e-6,
            fallback: FallbackPolicy::Always,
        }
    }
}

/// Tunables of the per-pixel classification.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub max_iterations: u32,
    pub tolerance: f64,
    pub derivative_threshold: f64,
}

impl ClassifyConfig {
    pub fn tolerance_squared(&self) -> f64 {
        self.tolerance * self.tolerance
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1.0e-6,
            derivative_threshold: 1.0e-14,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub classify: ClassifyConfig,
}

impl Config {
    pub fn encode(&self) -> Option<String> {
        ron::to_string(&self).ok()
    }

    pub fn decode(input: &str) -> Option<Self> {
        let input = input.trim();

        if let Ok(config) = ron::from_str(input) {
            return Some(config);
        }
        log::info!("Could not decode RON, trying JSON");
        if let Ok(config) = serde_json::from_str(input) {
            return Some(config);
        }
        log::warn!("Could not decode JSON");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ron_round_trip() {
        let mut config = Config::default();
        config.search.max_depth = 7;
        config.search.fallback = FallbackPolicy::WhenEmpty;
        config.classify.max_iterations = 250;

        let encoded = config.encode().unwrap();
        assert_eq!(Config::decode(&encoded), Some(config));
    }

    #[test]
    fn json_with_missing_fields_uses_defaults() {
        let config = Config::decode(r#"{ "classify": { "max_iterations": 30 } }"#).unwrap();
        assert_eq!(config.classify.max_iterations, 30);
        assert_eq!(config.classify.tolerance, 1.0e-6);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(Config::decode("not a config"), None);
    }
}
