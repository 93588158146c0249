use ethnum::U256;

/// One edge of a position's range together with the accounting snapshot the
/// pool keeps for that tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickBoundary {
    pub tick: i32,
    pub fee_growth_outside_0_x128: U256, // Fees outside for token0
    pub fee_growth_outside_1_x128: U256, // Fees outside for token1
}

impl TickBoundary {
    pub fn new(tick: i32) -> Self {
        Self {
            tick,
            fee_growth_outside_0_x128: U256::ZERO,
            fee_growth_outside_1_x128: U256::ZERO,
        }
    }
}
