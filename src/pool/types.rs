use ethnum::U256;
use std::fmt;

/// Fee tiers the protocol deploys pools with. Anything else coming from a
/// data source is rejected rather than guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeTier {
    Lowest,
    Low,
    Medium,
    High,
}

impl FeeTier {
    /// Swap fee in hundredths of a bip, the unit pools are keyed by.
    pub fn fee_pips(&self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    /// Spacing between initializable ticks for this tier.
    pub fn tick_spacing(&self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            100 => Ok(FeeTier::Lowest),
            500 => Ok(FeeTier::Low),
            3_000 => Ok(FeeTier::Medium),
            10_000 => Ok(FeeTier::High),
            other => Err(format!("unknown fee tier: {}", other)),
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fee_pips())
    }
}

/// Pool-wide accounting observed at a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub sqrt_price_x96: U256, // Current price in Q64.96 format
    pub tick: i32,            // Current tick index
    pub fee_growth_global_0_x128: U256, // Cumulative fees for token0
    pub fee_growth_global_1_x128: U256, // Cumulative fees for token1
    pub fee_tier: FeeTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_tier_round_trips_through_pips() {
        for tier in [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High] {
            assert_eq!(FeeTier::try_from(tier.fee_pips()), Ok(tier));
        }
    }

    #[test]
    fn test_fee_tier_rejects_unknown_values() {
        assert!(FeeTier::try_from(0).is_err());
        assert!(FeeTier::try_from(2_500).is_err());
        assert!(FeeTier::try_from(30_000).is_err());
    }

    #[test]
    fn test_fee_tier_tick_spacing() {
        assert_eq!(FeeTier::Lowest.tick_spacing(), 1);
        assert_eq!(FeeTier::Low.tick_spacing(), 10);
        assert_eq!(FeeTier::Medium.tick_spacing(), 60);
        assert_eq!(FeeTier::High.tick_spacing(), 200);
    }
}
