use super::{
    constants::Q96,
    full_math::{div_rounding_up, mul_div, mul_div_rounding_up},
};

use ethnum::U256;

#[derive(Debug, Clone, PartialEq)]
pub enum AmountDeltaError {
    InvalidPrice,
    Overflow,
}

const FIXED_POINT_96_RESOLUTION: u8 = 96; // 2^96 shift

fn sort_prices(sqrt_price_a_x96: U256, sqrt_price_b_x96: U256) -> (U256, U256) {
    if sqrt_price_a_x96 > sqrt_price_b_x96 {
        (sqrt_price_b_x96, sqrt_price_a_x96)
    } else {
        (sqrt_price_a_x96, sqrt_price_b_x96)
    }
}

/// Gets the amount0 delta between two sqrt prices, i.e.
/// liquidity * (sqrt(upper) - sqrt(lower)) / (sqrt(upper) * sqrt(lower)).
/// The order of the two prices does not matter.
pub fn get_amount_0_delta(
    sqrt_price_a_x96: U256,
    sqrt_price_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, AmountDeltaError> {
    let (sqrt_lower, sqrt_upper) = sort_prices(sqrt_price_a_x96, sqrt_price_b_x96);

    if sqrt_lower == U256::ZERO {
        return Err(AmountDeltaError::InvalidPrice);
    }

    let numerator1 = U256::from(liquidity) << FIXED_POINT_96_RESOLUTION;
    let numerator2 = sqrt_upper - sqrt_lower;

    if round_up {
        let quotient = mul_div_rounding_up(numerator1, numerator2, sqrt_upper)
            .map_err(|_e| AmountDeltaError::Overflow)?;
        Ok(div_rounding_up(quotient, sqrt_lower))
    } else {
        let quotient = mul_div(numerator1, numerator2, sqrt_upper)
            .map_err(|_e| AmountDeltaError::Overflow)?;
        Ok(quotient / sqrt_lower) // sqrt_lower != 0 checked above
    }
}

/// Gets the amount1 delta between two sqrt prices, i.e.
/// liquidity * (sqrt(upper) - sqrt(lower)) / 2^96.
/// The order of the two prices does not matter.
pub fn get_amount_1_delta(
    sqrt_price_a_x96: U256,
    sqrt_price_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, AmountDeltaError> {
    let (sqrt_lower, sqrt_upper) = sort_prices(sqrt_price_a_x96, sqrt_price_b_x96);
    let numerator = sqrt_upper - sqrt_lower;

    let result = if round_up {
        mul_div_rounding_up(U256::from(liquidity), numerator, *Q96)
    } else {
        mul_div(U256::from(liquidity), numerator, *Q96)
    };

    result.map_err(|_e| AmountDeltaError::Overflow)
}
