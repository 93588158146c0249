use ethnum::U256;

use super::constants::{MAX_TICK, MIN_TICK};

#[derive(Debug, Clone, PartialEq)]
pub enum TickMathError {
    TickOutOfBounds,
}

/// sqrt(1.0001)^-1 in Q128.128, applied when the low bit of |tick| is set.
const RATIO_BIT_0: U256 = U256::from_words(0, 0xfffcb933bd6fad37aa2d162d1a594001);

/// Multiplicative steps for bits 1..=19 of |tick|, each sqrt(1.0001)^-(2^k)
/// in Q128.128.
const RATIO_STEPS: [U256; 19] = [
    U256::from_words(0, 0xfff97272373d413259a46990580e213a),
    U256::from_words(0, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    U256::from_words(0, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    U256::from_words(0, 0xffcb9843d60f6159c9db58835c926644),
    U256::from_words(0, 0xff973b41fa98c081472e6896dfb254c0),
    U256::from_words(0, 0xff2ea16466c96a3843ec78b326b52861),
    U256::from_words(0, 0xfe5dee046a99a2a811c461f1969c3053),
    U256::from_words(0, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    U256::from_words(0, 0xf987a7253ac413176f2b074cf7815e54),
    U256::from_words(0, 0xf3392b0822b70005940c7a398e4b70f3),
    U256::from_words(0, 0xe7159475a2c29b7443b29c7fa6e889d9),
    U256::from_words(0, 0xd097f3bdfd2022b8845ad8f792aa5825),
    U256::from_words(0, 0xa9f746462d870fdf8a65dc1f90e061e5),
    U256::from_words(0, 0x70d869a156d2a1b890bb3df62baf32f7),
    U256::from_words(0, 0x31be135f97d08fd981231505542fcfa6),
    U256::from_words(0, 0x09aa508b5b7a84e1c677de54f3e99bc9),
    U256::from_words(0, 0x005d6af8dedb81196699c329225ee604),
    U256::from_words(0, 0x00002216e584f5fa1ea926041bedfe98),
    U256::from_words(0, 0x00000000048a170391f7dc42444e8fa2),
];

/// Calculates sqrt(1.0001^tick) * 2^96 as a Q64.96 fixed point number.
///
/// Bit-exact for the whole tick range: the ratio is built by integer
/// multiplication of precomputed Q128.128 steps, one per set bit of |tick|,
/// never by floating point.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, TickMathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(TickMathError::TickOutOfBounds);
    }

    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        RATIO_BIT_0
    } else {
        U256::from_words(1, 0) // 1.0 in Q128.128
    };

    for (i, step) in RATIO_STEPS.into_iter().enumerate() {
        if abs_tick & (1 << (i + 1)) != 0 {
            // ratio stays strictly below 2^128 once any step applies, so the
            // product never exceeds 256 bits
            ratio = (ratio * step) >> 128;
        }
    }

    // the steps compute the ratio for a negative tick; invert for positive
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up
    let sqrt_price_x96 = (ratio >> 32)
        + if ratio % (U256::ONE << 32) == U256::ZERO {
            U256::ZERO
        } else {
            U256::ONE
        };

    Ok(sqrt_price_x96)
}
