use std::time::Duration;
use tailtracer::CodePolicy;

/// How often the generator runs when no interval is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct ReceiverConfig {
    /// Time between batches
    pub interval: Duration,
    /// Traces synthesized per batch
    pub traces_per_tick: usize,
    /// Fixed seed for entity selection, entropy when unset
    pub seed: Option<u64>,
    pub code_policy: CodePolicy,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            traces_per_tick: 1,
            seed: None,
            code_policy: CodePolicy::Blank,
        }
    }
}

impl ReceiverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.traces_per_tick == 0 {
            return Err(ConfigError::ZeroTraces);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("traces per tick must be at least 1")]
    ZeroTraces,
    #[error("invalid interval {0:?}: expected a number followed by ms, s, m or h")]
    InvalidInterval(String),
}

/// Parse an interval such as `250ms`, `30s`, `1m` or `2h`
pub fn parse_interval(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidInterval(s.to_string());

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (value, unit) = s.split_at(split);
    let value: u64 = value.parse().map_err(|_| invalid())?;

    let interval = match unit {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(invalid)?),
        "h" => Duration::from_secs(value.checked_mul(3600).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };

    Ok(interval)
}
