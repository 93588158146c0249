use ethnum::U256;
use num_bigint::BigUint;
use num_traits::Zero;

use super::safe_cast::{big_uint_to_u256, u256_to_big_uint};

#[derive(Debug, Clone, PartialEq)]
pub enum FullMathError {
    DivisionByZero,
    Overflow,
}

/// Returns floor(a * b / denominator). The product is carried at full 512-bit
/// width, so the result errors only when the final quotient does not fit in a
/// U256.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, FullMathError> {
    mul_div_inner(a, b, denominator, false)
}

/// Returns ceil(a * b / denominator), with the same 512-bit intermediate as
/// `mul_div`.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, FullMathError> {
    mul_div_inner(a, b, denominator, true)
}

fn mul_div_inner(
    a: U256,
    b: U256,
    denominator: U256,
    round_up: bool,
) -> Result<U256, FullMathError> {
    if denominator == U256::ZERO {
        return Err(FullMathError::DivisionByZero);
    }

    let product = u256_to_big_uint(a) * u256_to_big_uint(b);
    let denominator = u256_to_big_uint(denominator);

    let mut quotient = &product / &denominator;
    if round_up && !(&product % &denominator).is_zero() {
        quotient += BigUint::from(1u32);
    }

    if quotient.bits() > 256 {
        return Err(FullMathError::Overflow);
    }

    big_uint_to_u256(quotient).map_err(|_| FullMathError::Overflow)
}

/// Returns ceil(x / y)
/// division by 0 will return 0, and should be checked externally
pub fn div_rounding_up(x: U256, y: U256) -> U256 {
    if y == U256::ZERO {
        return U256::ZERO;
    }
    let quotient = x / y;
    let remainder = x % y;
    quotient
        + if remainder > U256::ZERO {
            U256::ONE
        } else {
            U256::ZERO
        }
}
