pub mod amount_delta;
pub mod constants;
pub mod full_math;
pub mod safe_cast;
pub mod tick_math;
