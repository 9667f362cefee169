use crate::error::FeedResult;
use serde::{Deserialize, Serialize};

/// Upper bound on the paired-transaction window: one year.
pub const MAX_PAIRED_WINDOW_MINUTES: i64 = 365 * 24 * 60;

/// Bounds applied to every feed record before it reaches the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedLimits {
    pub authorization_prefix: String,
    pub max_description_len: usize,
    /// Amounts must lie in [-max_abs_amount, max_abs_amount].
    pub max_abs_amount: f64,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            authorization_prefix: "F".into(),
            max_description_len: 255,
            max_abs_amount: 100_000.0,
        }
    }
}

/// How the query layer treats repeated relation edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDedup {
    /// Keep every edge the detectors emitted, in emission order.
    Preserve,
    /// Collapse edges sharing (customer, related customer, relation type),
    /// keeping the first occurrence.
    #[default]
    Collapse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How far apart the two legs of a paired transfer may be recorded and
    /// still count as the same transfer. At most one year.
    #[serde(default = "default_paired_window_minutes")]
    pub paired_window_minutes: i64,
    #[serde(default)]
    pub relation_dedup: RelationDedup,
    #[serde(default)]
    pub limits: FeedLimits,
    /// Fail the analysis when an aggregate breaks a lifecycle invariant.
    /// Otherwise violations are logged and the report is still returned.
    #[serde(default)]
    pub strict_invariants: bool,
}

fn default_paired_window_minutes() -> i64 {
    60
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            paired_window_minutes: default_paired_window_minutes(),
            relation_dedup: RelationDedup::default(),
            limits: FeedLimits::default(),
            strict_invariants: false,
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &str) -> FeedResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Config used by the test suite: multiplicity preserved so tests see
    /// exactly what the detectors emit, and invariant breaks are fatal.
    pub fn default_test() -> Self {
        Self {
            relation_dedup: RelationDedup::Preserve,
            strict_invariants: true,
            ..Self::default()
        }
    }

    /// Paired window as a duration, clamped to [0, MAX_PAIRED_WINDOW_MINUTES]
    /// for configs built in code rather than loaded.
    pub fn paired_window(&self) -> chrono::Duration {
        let minutes = self.paired_window_minutes.clamp(0, MAX_PAIRED_WINDOW_MINUTES);
        chrono::Duration::try_minutes(minutes).unwrap_or_else(crate::paired_detector::default_window)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.paired_window_minutes < 0 {
            anyhow::bail!(
                "paired_window_minutes must be >= 0, got {}",
                self.paired_window_minutes
            );
        }
        if self.paired_window_minutes > MAX_PAIRED_WINDOW_MINUTES {
            anyhow::bail!(
                "paired_window_minutes must be <= {MAX_PAIRED_WINDOW_MINUTES}, got {}",
                self.paired_window_minutes
            );
        }
        if !(self.limits.max_abs_amount.is_finite() && self.limits.max_abs_amount > 0.0) {
            anyhow::bail!(
                "limits.max_abs_amount must be a positive number, got {}",
                self.limits.max_abs_amount
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "relation_dedup": "preserve" }"#).unwrap();
        assert_eq!(config.paired_window_minutes, 60);
        assert_eq!(config.relation_dedup, RelationDedup::Preserve);
        assert_eq!(config.limits, FeedLimits::default());
    }

    #[test]
    fn negative_window_is_rejected() {
        let config = AnalysisConfig {
            paired_window_minutes: -5,
            ..AnalysisConfig::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn oversized_window_is_rejected_and_clamped() {
        let config = AnalysisConfig {
            paired_window_minutes: 100_000_000_000_000,
            ..AnalysisConfig::default()
        };
        assert!(config.check().is_err());
        assert_eq!(config.paired_window(), chrono::Duration::days(365));

        let year = AnalysisConfig {
            paired_window_minutes: MAX_PAIRED_WINDOW_MINUTES,
            ..AnalysisConfig::default()
        };
        assert!(year.check().is_ok());
    }
}
