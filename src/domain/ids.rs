//! Record Id generation strategies.

use crate::domain::table::TableName;
use rand::Rng;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Produces candidate Ids for new records.
///
/// The engine re-asks on collision, so generators only need to be unlikely
/// to repeat themselves.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, table: TableName) -> String;
}

/// Process-wide counter. Starts at 1000 so it never meets the seed Ids.
pub struct MonotonicIdGenerator {
    next: AtomicU64,
}

impl MonotonicIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1000)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for MonotonicIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for MonotonicIdGenerator {
    fn next_id(&self, _table: TableName) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, _table: TableName) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Legacy scheme: a random number in 1000..=10999.
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self, _table: TableName) -> String {
        rand::thread_rng().gen_range(1000..11000u32).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    #[default]
    Monotonic,
    Uuid,
    Random,
}

impl IdStrategy {
    pub fn build(self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Monotonic => Box::new(MonotonicIdGenerator::new()),
            IdStrategy::Uuid => Box::new(UuidIdGenerator),
            IdStrategy::Random => Box::new(RandomIdGenerator),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monotonic" => Ok(IdStrategy::Monotonic),
            "uuid" => Ok(IdStrategy::Uuid),
            "random" => Ok(IdStrategy::Random),
            other => Err(format!("unknown id strategy '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_ids_increase() {
        let gen = MonotonicIdGenerator::new();
        assert_eq!(gen.next_id(TableName::Contact), "1000");
        assert_eq!(gen.next_id(TableName::Lead), "1001");
    }

    #[test]
    fn uuid_ids_are_distinct_and_non_empty() {
        let a = UuidIdGenerator.next_id(TableName::Contact);
        let b = UuidIdGenerator.next_id(TableName::Contact);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn random_ids_stay_in_legacy_range() {
        for _ in 0..100 {
            let n: u32 = RandomIdGenerator.next_id(TableName::Contact).parse().unwrap();
            assert!((1000..11000).contains(&n));
        }
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!("UUID".parse::<IdStrategy>(), Ok(IdStrategy::Uuid));
        assert!("sequential".parse::<IdStrategy>().is_err());
    }
}
