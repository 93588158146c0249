use ethnum::U256;
use serde::Deserialize;

use crate::{
    pool::types::{FeeTier, PoolSnapshot},
    position::types::PositionSnapshot,
    tick::types::TickBoundary,
};

use super::SubgraphError;

/// Standard GraphQL response envelope. The gateway reports query failures in
/// `errors` with a 200 status, never through HTTP codes.
#[derive(Debug, Deserialize)]
pub struct GraphResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQueryError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQueryError {
    pub message: String,
}

// Numeric fields arrive as decimal strings: the subgraph's BigInt and
// BigDecimal scalars do not fit JSON numbers.

#[derive(Debug, Deserialize)]
pub struct PositionsData {
    pub positions: Vec<PositionDto>,
}

#[derive(Debug, Deserialize)]
pub struct PositionDto {
    pub token0: TokenDto,
    pub token1: TokenDto,
    pub liquidity: String,
    #[serde(rename = "feeGrowthInside0LastX128")]
    pub fee_growth_inside_0_last_x128: String,
    #[serde(rename = "feeGrowthInside1LastX128")]
    pub fee_growth_inside_1_last_x128: String,
    #[serde(rename = "collectedFeesToken0")]
    pub collected_fees_token0: String,
    #[serde(rename = "collectedFeesToken1")]
    pub collected_fees_token1: String,
    pub pool: PoolDto,
    #[serde(rename = "tickLower")]
    pub tick_lower: TickDto,
    #[serde(rename = "tickUpper")]
    pub tick_upper: TickDto,
}

#[derive(Debug, Deserialize)]
pub struct TokenDto {
    pub name: String,
    pub decimals: String,
    #[serde(rename = "tokenDayData")]
    pub token_day_data: Vec<TokenDayDataDto>,
}

#[derive(Debug, Deserialize)]
pub struct TokenDayDataDto {
    #[serde(rename = "priceUSD")]
    pub price_usd: String,
    pub date: i64,
}

#[derive(Debug, Deserialize)]
pub struct PoolDto {
    #[serde(rename = "feeGrowthGlobal0X128")]
    pub fee_growth_global_0_x128: String,
    #[serde(rename = "feeGrowthGlobal1X128")]
    pub fee_growth_global_1_x128: String,
    pub tick: String,
    #[serde(rename = "sqrtPrice")]
    pub sqrt_price: String,
    #[serde(rename = "feeTier")]
    pub fee_tier: String,
}

#[derive(Debug, Deserialize)]
pub struct TickDto {
    #[serde(rename = "tickIdx")]
    pub tick_idx: String,
    #[serde(rename = "feeGrowthOutside0X128")]
    pub fee_growth_outside_0_x128: String,
    #[serde(rename = "feeGrowthOutside1X128")]
    pub fee_growth_outside_1_x128: String,
}

#[derive(Debug, Deserialize)]
pub struct PoolsData {
    pub pools: Vec<ReferencePoolDto>,
}

#[derive(Debug, Deserialize)]
pub struct ReferencePoolDto {
    #[serde(rename = "token0Price")]
    pub token0_price: String,
}

#[derive(Debug, Deserialize)]
pub struct CreationData {
    pub positions: Vec<PositionCreationDto>,
}

#[derive(Debug, Deserialize)]
pub struct PositionCreationDto {
    pub transaction: TransactionDto,
}

#[derive(Debug, Deserialize)]
pub struct TransactionDto {
    #[serde(rename = "blockNumber")]
    pub block_number: String,
}

#[derive(Debug, Deserialize)]
pub struct MetaData {
    #[serde(rename = "_meta")]
    pub meta: MetaDto,
}

#[derive(Debug, Deserialize)]
pub struct MetaDto {
    pub block: MetaBlockDto,
}

#[derive(Debug, Deserialize)]
pub struct MetaBlockDto {
    pub number: u64,
}

/// Everything needed to price one position at one block.
#[derive(Debug, Clone)]
pub struct PositionSnapshotBundle {
    pub position: PositionSnapshot,
    pub pool: PoolSnapshot,
    pub token0: TokenMeta,
    pub token1: TokenMeta,
}

#[derive(Debug, Clone)]
pub struct TokenMeta {
    pub name: String,
    pub decimals: u8,
    pub price_usd: f64,
    pub day_timestamp: i64, // unix seconds of the day the price belongs to
}

impl PositionDto {
    pub fn into_bundle(self) -> Result<PositionSnapshotBundle, SubgraphError> {
        let position = PositionSnapshot {
            liquidity: parse_u128("position.liquidity", &self.liquidity)?,
            tick_lower: self.tick_lower.into_boundary()?,
            tick_upper: self.tick_upper.into_boundary()?,
            fee_growth_inside_0_last_x128: parse_u256(
                "position.feeGrowthInside0LastX128",
                &self.fee_growth_inside_0_last_x128,
            )?,
            fee_growth_inside_1_last_x128: parse_u256(
                "position.feeGrowthInside1LastX128",
                &self.fee_growth_inside_1_last_x128,
            )?,
            collected_fees_token0: parse_f64(
                "position.collectedFeesToken0",
                &self.collected_fees_token0,
            )?,
            collected_fees_token1: parse_f64(
                "position.collectedFeesToken1",
                &self.collected_fees_token1,
            )?,
        };

        Ok(PositionSnapshotBundle {
            position,
            pool: self.pool.into_snapshot()?,
            token0: self.token0.into_meta()?,
            token1: self.token1.into_meta()?,
        })
    }
}

impl TickDto {
    fn into_boundary(self) -> Result<TickBoundary, SubgraphError> {
        Ok(TickBoundary {
            tick: parse_i32("tick.tickIdx", &self.tick_idx)?,
            fee_growth_outside_0_x128: parse_u256(
                "tick.feeGrowthOutside0X128",
                &self.fee_growth_outside_0_x128,
            )?,
            fee_growth_outside_1_x128: parse_u256(
                "tick.feeGrowthOutside1X128",
                &self.fee_growth_outside_1_x128,
            )?,
        })
    }
}

impl PoolDto {
    fn into_snapshot(self) -> Result<PoolSnapshot, SubgraphError> {
        let fee_tier = FeeTier::try_from(parse_u32("pool.feeTier", &self.fee_tier)?)
            .map_err(|_e| invalid("pool.feeTier", &self.fee_tier))?;

        Ok(PoolSnapshot {
            sqrt_price_x96: parse_u256("pool.sqrtPrice", &self.sqrt_price)?,
            tick: parse_i32("pool.tick", &self.tick)?,
            fee_growth_global_0_x128: parse_u256(
                "pool.feeGrowthGlobal0X128",
                &self.fee_growth_global_0_x128,
            )?,
            fee_growth_global_1_x128: parse_u256(
                "pool.feeGrowthGlobal1X128",
                &self.fee_growth_global_1_x128,
            )?,
            fee_tier,
        })
    }
}

impl TokenDto {
    fn into_meta(self) -> Result<TokenMeta, SubgraphError> {
        let day = self
            .token_day_data
            .into_iter()
            .next()
            .ok_or(SubgraphError::MissingField("tokenDayData"))?;

        Ok(TokenMeta {
            name: self.name,
            decimals: parse_u8("token.decimals", &self.decimals)?,
            price_usd: parse_f64("tokenDayData.priceUSD", &day.price_usd)?,
            day_timestamp: day.date,
        })
    }
}

fn invalid(field: &'static str, value: &str) -> SubgraphError {
    SubgraphError::InvalidData {
        field,
        value: value.to_string(),
    }
}

pub(crate) fn parse_u256(field: &'static str, value: &str) -> Result<U256, SubgraphError> {
    U256::from_str_radix(value, 10).map_err(|_e| invalid(field, value))
}

pub(crate) fn parse_u128(field: &'static str, value: &str) -> Result<u128, SubgraphError> {
    value.parse().map_err(|_e| invalid(field, value))
}

pub(crate) fn parse_u64(field: &'static str, value: &str) -> Result<u64, SubgraphError> {
    value.parse().map_err(|_e| invalid(field, value))
}

pub(crate) fn parse_u32(field: &'static str, value: &str) -> Result<u32, SubgraphError> {
    value.parse().map_err(|_e| invalid(field, value))
}

pub(crate) fn parse_u8(field: &'static str, value: &str) -> Result<u8, SubgraphError> {
    value.parse().map_err(|_e| invalid(field, value))
}

pub(crate) fn parse_i32(field: &'static str, value: &str) -> Result<i32, SubgraphError> {
    value.parse().map_err(|_e| invalid(field, value))
}

pub(crate) fn parse_f64(field: &'static str, value: &str) -> Result<f64, SubgraphError> {
    value.parse().map_err(|_e| invalid(field, value))
}
