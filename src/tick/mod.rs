use ethnum::U256;
use types::TickBoundary;

pub mod types;


/// Computes the all-time fee growth per unit of liquidity inside the range
/// [lower, upper), split out of the global counters by the "below / above"
/// decomposition relative to the current tick.
///
/// Every subtraction wraps mod 2^256. The counters are allowed to overflow by
/// design, and differences of later snapshots cancel the wrap.
pub fn fee_growth_inside(
    lower: &TickBoundary,
    upper: &TickBoundary,
    current_tick: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    let (fee_growth_below_0_x128, fee_growth_below_1_x128) = if current_tick >= lower.tick {
        (
            lower.fee_growth_outside_0_x128,
            lower.fee_growth_outside_1_x128,
        )
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(lower.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(lower.fee_growth_outside_1_x128),
        )
    };

    let (fee_growth_above_0_x128, fee_growth_above_1_x128) = if current_tick < upper.tick {
        (
            upper.fee_growth_outside_0_x128,
            upper.fee_growth_outside_1_x128,
        )
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(upper.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(upper.fee_growth_outside_1_x128),
        )
    };

    (
        fee_growth_global_0_x128
            .wrapping_sub(fee_growth_below_0_x128)
            .wrapping_sub(fee_growth_above_0_x128),
        fee_growth_global_1_x128
            .wrapping_sub(fee_growth_below_1_x128)
            .wrapping_sub(fee_growth_above_1_x128),
    )
}
