//! Durability aggregation по частям оружия

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{MAX_DURABILITY, MIN_DURABILITY};

/// Как сводить durability частей в одно число
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum DurabilityMode {
    #[default]
    Average,
    Minimum,
    Maximum,
}

/// Свести значения; пустой набор → 0
pub fn aggregate_durability(values: impl IntoIterator<Item = f32>, mode: DurabilityMode) -> f32 {
    let mut count = 0usize;
    let mut sum = 0.0f32;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;

    for value in values {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return 0.0;
    }

    match mode {
        DurabilityMode::Average => sum / count as f32,
        DurabilityMode::Minimum => min,
        DurabilityMode::Maximum => max,
    }
}

pub fn clamp_durability(value: f32) -> f32 {
    value.clamp(MIN_DURABILITY, MAX_DURABILITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_modes() {
        let values = [90.0, 60.0, 75.0];
        assert_eq!(aggregate_durability(values, DurabilityMode::Average), 75.0);
        assert_eq!(aggregate_durability(values, DurabilityMode::Minimum), 60.0);
        assert_eq!(aggregate_durability(values, DurabilityMode::Maximum), 90.0);
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        for mode in [DurabilityMode::Average, DurabilityMode::Minimum, DurabilityMode::Maximum] {
            assert_eq!(aggregate_durability(std::iter::empty(), mode), 0.0);
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_durability(-3.0), 0.0);
        assert_eq!(clamp_durability(150.0), 100.0);
        assert_eq!(clamp_durability(42.5), 42.5);
    }
}
