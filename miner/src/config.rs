use crate::error::MiningError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the orchestrator does when every solver attempt for a block fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceFailurePolicy {
    /// Roll back, report the block as not produced, continue with the next
    /// requested block.
    Skip,
    /// Roll back and re-run assembly plus race up to `max_attempts` times
    /// before giving the block up.
    Retry { max_attempts: u32 },
}

/// Runtime configuration for the mining cycle. Every field has a default
/// and can be overridden by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Solver attempts raced per block (default: available parallelism)
    pub workers: usize,

    /// Messages required before a non-genesis block is assembled
    pub min_batch: usize,

    /// Most messages a single block may carry
    pub max_batch: usize,

    /// Pending messages required before the first non-genesis block of a
    /// cycle is attempted
    pub message_threshold: usize,

    /// Upper bound on wakeup latency for blocking waits
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,

    /// Bound on blocking waits; `None` waits forever
    #[serde(with = "opt_duration_millis")]
    pub wait_timeout: Option<Duration>,

    /// Blocks to attempt per mining cycle
    pub blocks_per_cycle: usize,

    /// Leading zero hex digits a block fingerprint must have
    pub difficulty: u32,

    pub on_race_failure: RaceFailurePolicy,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            min_batch: crate::DEFAULT_MIN_BATCH,
            max_batch: crate::DEFAULT_MAX_BATCH,
            message_threshold: crate::DEFAULT_MESSAGE_THRESHOLD,
            poll_interval: Duration::from_millis(crate::DEFAULT_POLL_INTERVAL_MS),
            wait_timeout: Some(Duration::from_secs(crate::DEFAULT_WAIT_TIMEOUT_SECS)),
            blocks_per_cycle: crate::DEFAULT_BLOCKS_PER_CYCLE,
            difficulty: crate::DEFAULT_DIFFICULTY,
            on_race_failure: RaceFailurePolicy::Skip,
        }
    }
}

impl MinerConfig {
    pub fn validate(&self) -> Result<(), MiningError> {
        if self.workers == 0 {
            return Err(MiningError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        if self.max_batch == 0 {
            return Err(MiningError::InvalidConfig(
                "max_batch must be at least 1".into(),
            ));
        }
        if self.min_batch > self.max_batch {
            return Err(MiningError::InvalidConfig(format!(
                "min_batch {} exceeds max_batch {}",
                self.min_batch, self.max_batch
            )));
        }
        if let RaceFailurePolicy::Retry { max_attempts: 0 } = self.on_race_failure {
            return Err(MiningError::InvalidConfig(
                "retry policy needs max_attempts >= 1".into(),
            ));
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

mod opt_duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
