use crate::tick::types::TickBoundary;
use ethnum::U256;

/// A liquidity position plus the fee accounting recorded the last time it
/// touched the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSnapshot {
    pub liquidity: u128, // Position liquidity
    pub tick_lower: TickBoundary,
    pub tick_upper: TickBoundary,
    pub fee_growth_inside_0_last_x128: U256, // Fees for token0 at last update
    pub fee_growth_inside_1_last_x128: U256, // Fees for token1 at last update
    pub collected_fees_token0: f64, // Already withdrawn, in whole token units
    pub collected_fees_token1: f64,
}

/// A pair of token quantities in each asset's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetAmounts {
    pub amount0: U256,
    pub amount1: U256,
}

impl AssetAmounts {
    pub const ZERO: AssetAmounts = AssetAmounts {
        amount0: U256::ZERO,
        amount1: U256::ZERO,
    };
}
