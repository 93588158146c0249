use ethnum::U256;
use types::{AssetAmounts, PositionSnapshot};

use crate::{
    libraries::{
        amount_delta::{AmountDeltaError, get_amount_0_delta, get_amount_1_delta},
        constants::{MAX_TICK, MIN_TICK, Q128},
        full_math::{FullMathError, mul_div},
        tick_math,
    },
    pool::types::PoolSnapshot,
    tick,
};

pub mod types;

#[derive(Debug, Clone, PartialEq)]
pub enum PositionMathError {
    InvalidTickRange { lower: i32, upper: i32 },
    TickOutOfBounds { tick: i32 },
    InvalidSqrtPrice,
    Overflow,
}

impl From<FullMathError> for PositionMathError {
    fn from(value: FullMathError) -> Self {
        match value {
            // fee math divides by the Q128 constant, so a zero denominator
            // cannot actually surface here
            FullMathError::DivisionByZero | FullMathError::Overflow => PositionMathError::Overflow,
        }
    }
}

impl From<AmountDeltaError> for PositionMathError {
    fn from(value: AmountDeltaError) -> Self {
        match value {
            AmountDeltaError::InvalidPrice => PositionMathError::InvalidSqrtPrice,
            AmountDeltaError::Overflow => PositionMathError::Overflow,
        }
    }
}

fn validate_range(
    position: &PositionSnapshot,
    pool: &PoolSnapshot,
) -> Result<(), PositionMathError> {
    let lower = position.tick_lower.tick;
    let upper = position.tick_upper.tick;

    if lower >= upper {
        return Err(PositionMathError::InvalidTickRange { lower, upper });
    }
    for tick in [lower, upper, pool.tick] {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(PositionMathError::TickOutOfBounds { tick });
        }
    }
    Ok(())
}

/// Fees the position has earned since its recorded snapshot, per token, in
/// the token's smallest unit.
///
/// The difference against the last snapshot wraps mod 2^256; growth counters
/// overflow by design and the wrap cancels out of the delta. The result is
/// exact as long as fewer than 2^256 fee units per liquidity accrued between
/// the two snapshots.
pub fn unclaimed_fees(
    position: &PositionSnapshot,
    pool: &PoolSnapshot,
) -> Result<AssetAmounts, PositionMathError> {
    validate_range(position, pool)?;

    if position.liquidity == 0 {
        return Ok(AssetAmounts::ZERO);
    }

    let (fee_growth_inside_0_x128, fee_growth_inside_1_x128) = tick::fee_growth_inside(
        &position.tick_lower,
        &position.tick_upper,
        pool.tick,
        pool.fee_growth_global_0_x128,
        pool.fee_growth_global_1_x128,
    );

    let accrued_0_x128 =
        fee_growth_inside_0_x128.wrapping_sub(position.fee_growth_inside_0_last_x128);
    let accrued_1_x128 =
        fee_growth_inside_1_x128.wrapping_sub(position.fee_growth_inside_1_last_x128);

    let amount0 = mul_div(accrued_0_x128, U256::from(position.liquidity), *Q128)?;
    let amount1 = mul_div(accrued_1_x128, U256::from(position.liquidity), *Q128)?;

    Ok(AssetAmounts { amount0, amount1 })
}

/// Token amounts the position's liquidity is currently worth, rounded down.
///
/// The region is selected by the current tick alone, with the range half
/// open: a pool sitting exactly on the lower tick is in range, one sitting
/// exactly on the upper tick is above it.
pub fn token_amounts(
    position: &PositionSnapshot,
    pool: &PoolSnapshot,
) -> Result<AssetAmounts, PositionMathError> {
    validate_range(position, pool)?;

    let tick_lower = position.tick_lower.tick;
    let tick_upper = position.tick_upper.tick;

    let sqrt_lower = tick_math::get_sqrt_ratio_at_tick(tick_lower)
        .map_err(|_e| PositionMathError::TickOutOfBounds { tick: tick_lower })?;
    let sqrt_upper = tick_math::get_sqrt_ratio_at_tick(tick_upper)
        .map_err(|_e| PositionMathError::TickOutOfBounds { tick: tick_upper })?;

    if pool.tick < tick_lower {
        // all value waits in token0 below the range
        Ok(AssetAmounts {
            amount0: get_amount_0_delta(sqrt_lower, sqrt_upper, position.liquidity, false)?,
            amount1: U256::ZERO,
        })
    } else if pool.tick < tick_upper {
        Ok(AssetAmounts {
            amount0: get_amount_0_delta(pool.sqrt_price_x96, sqrt_upper, position.liquidity, false)?,
            amount1: get_amount_1_delta(sqrt_lower, pool.sqrt_price_x96, position.liquidity, false)?,
        })
    } else {
        // at or above the upper tick everything converted to token1
        Ok(AssetAmounts {
            amount0: U256::ZERO,
            amount1: get_amount_1_delta(sqrt_lower, sqrt_upper, position.liquidity, false)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libraries::constants::Q96;
    use crate::pool::types::FeeTier;
    use crate::tick::types::TickBoundary;
    use proptest::prelude::*;

    fn position(liquidity: u128, tick_lower: i32, tick_upper: i32) -> PositionSnapshot {
        PositionSnapshot {
            liquidity,
            tick_lower: TickBoundary::new(tick_lower),
            tick_upper: TickBoundary::new(tick_upper),
            fee_growth_inside_0_last_x128: U256::ZERO,
            fee_growth_inside_1_last_x128: U256::ZERO,
            collected_fees_token0: 0.0,
            collected_fees_token1: 0.0,
        }
    }

    fn pool_at(tick: i32, sqrt_price_x96: U256) -> PoolSnapshot {
        PoolSnapshot {
            sqrt_price_x96,
            tick,
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
            fee_tier: FeeTier::Medium,
        }
    }

    fn sqrt_at(tick: i32) -> U256 {
        tick_math::get_sqrt_ratio_at_tick(tick).unwrap()
    }

    mod unclaimed_fees {
        use super::*;

        #[test]
        fn zero_liquidity_owes_nothing() {
            let position = position(0, -60, 60);
            let mut pool = pool_at(0, *Q96);
            pool.fee_growth_global_0_x128 = U256::from(9_u8) << 128;
            pool.fee_growth_global_1_x128 = U256::from(4_u8) << 128;

            assert_eq!(unclaimed_fees(&position, &pool), Ok(AssetAmounts::ZERO));
        }

        #[test]
        fn fee_is_growth_delta_times_liquidity_shifted_down() {
            let position = position(500, -60, 60);
            let mut pool = pool_at(0, *Q96);
            pool.fee_growth_global_0_x128 = U256::from(3_u8) << 128;
            pool.fee_growth_global_1_x128 = U256::ONE << 127;

            let fees = unclaimed_fees(&position, &pool).unwrap();
            assert_eq!(fees.amount0, U256::from(1500_u32));
            assert_eq!(fees.amount1, U256::from(250_u32)); // floor(0.5 * 500)
        }

        #[test]
        fn counts_only_growth_inside_the_range() {
            let mut position = position(7, -60, 60);
            position.tick_lower.fee_growth_outside_0_x128 = U256::ONE << 128;
            position.tick_upper.fee_growth_outside_0_x128 = U256::from(2_u8) << 128;
            position.fee_growth_inside_0_last_x128 = U256::ONE << 128;

            let mut pool = pool_at(0, *Q96);
            pool.fee_growth_global_0_x128 = U256::from(6_u8) << 128;

            // inside = 6 - 1 - 2 = 3, accrued since snapshot = 3 - 1 = 2
            let fees = unclaimed_fees(&position, &pool).unwrap();
            assert_eq!(fees.amount0, U256::from(14_u8));
            assert_eq!(fees.amount1, U256::ZERO);
        }

        #[test]
        fn survives_wrapped_growth_counters() {
            let mut position = position(100, -60, 60);
            position.fee_growth_inside_0_last_x128 =
                U256::MAX.wrapping_sub(U256::from(2_u8) << 128);

            let mut pool = pool_at(0, *Q96);
            pool.fee_growth_global_0_x128 = U256::from(3_u8) << 128;

            // the counter wrapped between snapshots; the true delta is
            // 5 * 2^128 + 1
            let fees = unclaimed_fees(&position, &pool).unwrap();
            assert_eq!(fees.amount0, U256::from(500_u32));
        }

        #[test]
        fn snapshot_round_trip_owes_nothing() {
            let lower = TickBoundary {
                tick: -60,
                fee_growth_outside_0_x128: U256::MAX.wrapping_sub(U256::from(3_u8)),
                fee_growth_outside_1_x128: U256::MAX.wrapping_sub(U256::from(2_u8)),
            };
            let upper = TickBoundary {
                tick: 60,
                fee_growth_outside_0_x128: U256::from(3_u8),
                fee_growth_outside_1_x128: U256::from(5_u8),
            };

            let mut pool = pool_at(0, *Q96);
            pool.fee_growth_global_0_x128 = U256::from(15_u8);
            pool.fee_growth_global_1_x128 = U256::from(15_u8);

            let (inside_0, inside_1) = tick::fee_growth_inside(
                &lower,
                &upper,
                pool.tick,
                pool.fee_growth_global_0_x128,
                pool.fee_growth_global_1_x128,
            );

            let snapshot = PositionSnapshot {
                liquidity: u128::MAX,
                tick_lower: lower,
                tick_upper: upper,
                fee_growth_inside_0_last_x128: inside_0,
                fee_growth_inside_1_last_x128: inside_1,
                collected_fees_token0: 0.0,
                collected_fees_token1: 0.0,
            };

            assert_eq!(unclaimed_fees(&snapshot, &pool), Ok(AssetAmounts::ZERO));
        }

        #[test]
        fn rejects_inverted_or_empty_range() {
            let pool = pool_at(0, *Q96);

            assert_eq!(
                unclaimed_fees(&position(1, 60, -60), &pool),
                Err(PositionMathError::InvalidTickRange {
                    lower: 60,
                    upper: -60
                })
            );
            assert_eq!(
                unclaimed_fees(&position(1, 60, 60), &pool),
                Err(PositionMathError::InvalidTickRange {
                    lower: 60,
                    upper: 60
                })
            );
        }

        #[test]
        fn rejects_out_of_bounds_ticks() {
            let pool = pool_at(0, *Q96);
            assert_eq!(
                unclaimed_fees(&position(1, MIN_TICK - 1, 60), &pool),
                Err(PositionMathError::TickOutOfBounds {
                    tick: MIN_TICK - 1
                })
            );

            let wild_pool = pool_at(MAX_TICK + 1, *Q96);
            assert_eq!(
                unclaimed_fees(&position(1, -60, 60), &wild_pool),
                Err(PositionMathError::TickOutOfBounds {
                    tick: MAX_TICK + 1
                })
            );
        }

        proptest! {
            // taking a snapshot and immediately recomputing against it owes
            // nothing, wrapped counters included
            #[test]
            fn test_fuzz_snapshot_round_trip_is_drift_free(
                global_0_hi in any::<u128>(),
                global_0_lo in any::<u128>(),
                global_1_hi in any::<u128>(),
                global_1_lo in any::<u128>(),
                lower_out in any::<u128>(),
                upper_out in any::<u128>(),
                t1 in MIN_TICK..=MAX_TICK,
                t2 in MIN_TICK..=MAX_TICK,
                current in MIN_TICK..=MAX_TICK,
                liquidity in 1u128..,
            ) {
                prop_assume!(t1 != t2);
                let (tick_lower, tick_upper) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

                let lower = TickBoundary {
                    tick: tick_lower,
                    fee_growth_outside_0_x128: U256::from(lower_out),
                    fee_growth_outside_1_x128: U256::from(lower_out),
                };
                let upper = TickBoundary {
                    tick: tick_upper,
                    fee_growth_outside_0_x128: U256::from(upper_out),
                    fee_growth_outside_1_x128: U256::from(upper_out),
                };

                let mut pool = pool_at(current, *Q96);
                pool.fee_growth_global_0_x128 = U256::from_words(global_0_hi, global_0_lo);
                pool.fee_growth_global_1_x128 = U256::from_words(global_1_hi, global_1_lo);

                let (inside_0, inside_1) = tick::fee_growth_inside(
                    &lower,
                    &upper,
                    pool.tick,
                    pool.fee_growth_global_0_x128,
                    pool.fee_growth_global_1_x128,
                );

                let snapshot = PositionSnapshot {
                    liquidity,
                    tick_lower: lower,
                    tick_upper: upper,
                    fee_growth_inside_0_last_x128: inside_0,
                    fee_growth_inside_1_last_x128: inside_1,
                    collected_fees_token0: 0.0,
                    collected_fees_token1: 0.0,
                };

                prop_assert_eq!(unclaimed_fees(&snapshot, &pool), Ok(AssetAmounts::ZERO));
            }
        }
    }

    mod token_amounts {
        use super::*;

        #[test]
        fn below_range_holds_only_token0() {
            let position = position(1_000_000, -60, 60);
            let pool = pool_at(-120, sqrt_at(-120));

            let amounts = token_amounts(&position, &pool).unwrap();
            assert_eq!(
                amounts.amount0,
                get_amount_0_delta(sqrt_at(-60), sqrt_at(60), 1_000_000, false).unwrap()
            );
            assert_eq!(amounts.amount1, U256::ZERO);
            assert!(amounts.amount0 > U256::ZERO);
        }

        #[test]
        fn above_range_holds_only_token1() {
            let position = position(1_000_000, -60, 60);
            let pool = pool_at(120, sqrt_at(120));

            let amounts = token_amounts(&position, &pool).unwrap();
            assert_eq!(amounts.amount0, U256::ZERO);
            assert_eq!(
                amounts.amount1,
                get_amount_1_delta(sqrt_at(-60), sqrt_at(60), 1_000_000, false).unwrap()
            );
            assert!(amounts.amount1 > U256::ZERO);
        }

        #[test]
        fn in_range_splits_across_both_tokens() {
            let position = position(1_000_000, -60, 60);
            let pool = pool_at(0, *Q96);

            let amounts = token_amounts(&position, &pool).unwrap();
            assert_eq!(
                amounts.amount0,
                get_amount_0_delta(*Q96, sqrt_at(60), 1_000_000, false).unwrap()
            );
            assert_eq!(
                amounts.amount1,
                get_amount_1_delta(sqrt_at(-60), *Q96, 1_000_000, false).unwrap()
            );
            assert!(amounts.amount0 > U256::ZERO);
            assert!(amounts.amount1 > U256::ZERO);
        }

        #[test]
        fn region_selection_keys_on_tick_not_price() {
            let position = position(1_000_000, -60, 60);

            // tick pinned to the upper boundary selects the above-range
            // branch no matter what the reported price says
            let pool = pool_at(60, *Q96);
            let amounts = token_amounts(&position, &pool).unwrap();
            assert_eq!(amounts.amount0, U256::ZERO);
            assert_eq!(
                amounts.amount1,
                get_amount_1_delta(sqrt_at(-60), sqrt_at(60), 1_000_000, false).unwrap()
            );
        }

        #[test]
        fn boundary_ticks_follow_half_open_convention() {
            let position = position(1_000_000, -60, 60);

            // sitting exactly on the lower tick is in range
            let at_lower = token_amounts(&position, &pool_at(-60, sqrt_at(-60))).unwrap();
            assert!(at_lower.amount0 > U256::ZERO);
            assert_eq!(at_lower.amount1, U256::ZERO); // nothing converted yet

            // one tick below is out of range
            let below = token_amounts(&position, &pool_at(-61, sqrt_at(-61))).unwrap();
            assert_eq!(below.amount1, U256::ZERO);
            assert_eq!(below.amount0, at_lower.amount0);

            // sitting exactly on the upper tick is above the range
            let at_upper = token_amounts(&position, &pool_at(60, sqrt_at(60))).unwrap();
            assert_eq!(at_upper.amount0, U256::ZERO);
            assert!(at_upper.amount1 > U256::ZERO);
        }

        #[test]
        fn zero_liquidity_values_to_zero() {
            for tick in [-120, 0, 120] {
                let amounts =
                    token_amounts(&position(0, -60, 60), &pool_at(tick, sqrt_at(tick))).unwrap();
                assert_eq!(amounts, AssetAmounts::ZERO);
            }
        }

        #[test]
        fn full_range_position_values_both_tokens_equally() {
            // widest 60-spacing-aligned range, price exactly 1
            let position = position(1_000_000_000, -887220, 887220);
            let pool = pool_at(0, *Q96);

            let amounts = token_amounts(&position, &pool).unwrap();
            assert_eq!(amounts.amount0, amounts.amount1);
            assert_eq!(amounts.amount0, U256::from(999_999_999_u32));
        }

        #[test]
        fn absurd_sqrt_price_overflows() {
            let position = position(u128::MAX, -60, 60);
            let pool = pool_at(0, U256::ONE << 255);

            assert_eq!(
                token_amounts(&position, &pool),
                Err(PositionMathError::Overflow)
            );
        }

        #[test]
        fn zero_sqrt_price_in_range_is_invalid() {
            let position = position(1, -60, 60);
            let pool = pool_at(0, U256::ZERO);

            assert_eq!(
                token_amounts(&position, &pool),
                Err(PositionMathError::InvalidSqrtPrice)
            );
        }

        #[test]
        fn rejects_inverted_or_empty_range() {
            let pool = pool_at(0, *Q96);
            assert_eq!(
                token_amounts(&position(1, 10, 10), &pool),
                Err(PositionMathError::InvalidTickRange {
                    lower: 10,
                    upper: 10
                })
            );
        }

        #[test]
        fn rejects_out_of_bounds_ticks() {
            let pool = pool_at(0, *Q96);
            assert_eq!(
                token_amounts(&position(1, -60, MAX_TICK + 1), &pool),
                Err(PositionMathError::TickOutOfBounds {
                    tick: MAX_TICK + 1
                })
            );
        }

        proptest! {
            #[test]
            fn test_fuzz_amounts_grow_with_liquidity(
                l1 in any::<u128>(),
                l2 in any::<u128>(),
                current in -600i32..=600,
            ) {
                let (small, large) = if l1 < l2 { (l1, l2) } else { (l2, l1) };

                let pool = pool_at(current, sqrt_at(current));
                let small_amounts =
                    token_amounts(&position(small, -600, 600), &pool).unwrap();
                let large_amounts =
                    token_amounts(&position(large, -600, 600), &pool).unwrap();

                prop_assert!(small_amounts.amount0 <= large_amounts.amount0);
                prop_assert!(small_amounts.amount1 <= large_amounts.amount1);
            }

            // doubling liquidity doubles each amount, up to one unit lost to
            // the floor
            #[test]
            fn test_fuzz_doubling_liquidity_doubles_amounts(
                liquidity in 1..=u128::MAX / 2,
                current in -600i32..=600,
            ) {
                let pool = pool_at(current, sqrt_at(current));
                let single = token_amounts(&position(liquidity, -600, 600), &pool).unwrap();
                let double =
                    token_amounts(&position(liquidity * 2, -600, 600), &pool).unwrap();

                let twice_0 = single.amount0 * U256::from(2_u8);
                let twice_1 = single.amount1 * U256::from(2_u8);
                prop_assert!(double.amount0 == twice_0 || double.amount0 == twice_0 + U256::ONE);
                prop_assert!(double.amount1 == twice_1 || double.amount1 == twice_1 + U256::ONE);
            }
        }
    }
}
