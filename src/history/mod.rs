use chrono::DateTime;
use ethnum::U256;
use tracing::{debug, info, warn};

use crate::{
    libraries::{constants::MAX_TICK, safe_cast::u256_to_f64, tick_math},
    pool::types::PoolSnapshot,
    position::{self, PositionMathError},
    report::PositionRow,
    subgraph::{SubgraphClient, SubgraphError, types::PositionSnapshotBundle},
};

/// Blocks between samples, about one day at 13 seconds per block.
pub const DEFAULT_BLOCK_GAP: u64 = 6646;

/// What to do with a block that fails to produce a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    Abort,
    Skip,
}

#[derive(Debug, Clone)]
pub struct ScanParams {
    pub position_id: u64,
    pub block_gap: u64,
    pub on_error: ErrorPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("position {0} does not exist on the subgraph")]
    PositionNotFound(u64),
    #[error(transparent)]
    Subgraph(#[from] SubgraphError),
    #[error("position math failed at block {block}: {error:?}")]
    Math {
        block: u64,
        error: PositionMathError,
    },
}

/// Walks the position's life from its creation block to the subgraph's head
/// in `block_gap` steps and produces one report row per sampled block.
///
/// The range is fixed up front by querying the creation block and the indexer
/// head, so exhausting it ends the walk normally. A block inside the range
/// for which the subgraph returns no position data also ends the walk, as
/// everything past it is unindexed too.
pub async fn scan(
    client: &SubgraphClient,
    params: &ScanParams,
) -> Result<Vec<PositionRow>, ScanError> {
    let creation = client
        .creation_block(params.position_id)
        .await?
        .ok_or(ScanError::PositionNotFound(params.position_id))?;
    let head = client.head_block().await?;
    info!(
        position_id = params.position_id,
        creation, head, "scanning position history"
    );

    let gap = params.block_gap.max(1);
    let mut rows = Vec::new();
    let mut block = creation;
    while block <= head {
        match sample_block(client, params.position_id, block).await {
            Ok(Some(row)) => {
                debug!(block, date = %row.date, "sampled block");
                rows.push(row);
            }
            Ok(None) => {
                info!(block, "no position data at this block, ending the walk");
                break;
            }
            Err(error) => match params.on_error {
                ErrorPolicy::Abort => return Err(error),
                ErrorPolicy::Skip => warn!(block, %error, "skipping block"),
            },
        }
        block += gap;
    }

    Ok(rows)
}

async fn sample_block(
    client: &SubgraphClient,
    position_id: u64,
    block: u64,
) -> Result<Option<PositionRow>, ScanError> {
    let Some(bundle) = client.position_snapshot(position_id, Some(block)).await? else {
        return Ok(None);
    };
    let eth_price = client.eth_price_usd(Some(block)).await?;

    let row = build_row(&bundle, eth_price).map_err(|error| ScanError::Math { block, error })?;
    Ok(Some(row))
}

/// Prices one snapshot into a report row.
///
/// Exact U256 results are converted to floats only here, at the display
/// boundary, after all fee and amount math has run at full width.
pub fn build_row(
    bundle: &PositionSnapshotBundle,
    eth_price: f64,
) -> Result<PositionRow, PositionMathError> {
    check_price_alignment(&bundle.pool);

    let fees = position::unclaimed_fees(&bundle.position, &bundle.pool)?;
    let amounts = position::token_amounts(&bundle.position, &bundle.pool)?;

    let fees0 =
        to_decimal(fees.amount0, bundle.token0.decimals) + bundle.position.collected_fees_token0;
    let fees1 =
        to_decimal(fees.amount1, bundle.token1.decimals) + bundle.position.collected_fees_token1;
    let amount0 = to_decimal(amounts.amount0, bundle.token0.decimals);
    let amount1 = to_decimal(amounts.amount1, bundle.token1.decimals);

    let price0 = bundle.token0.price_usd;
    let price1 = bundle.token1.price_usd;

    let total_fee_value = fees0 * price0 + fees1 * price1;
    let total_value_excluding_fees = amount0 * price0 + amount1 * price1;
    let total_value_including_fees = total_value_excluding_fees + total_fee_value;

    Ok(PositionRow {
        date: format_day(bundle.token1.day_timestamp),
        price0,
        price1,
        name0: bundle.token0.name.clone(),
        name1: bundle.token1.name.clone(),
        fees0,
        fees1,
        total_fee_value,
        amount0,
        amount1,
        total_value_excluding_fees,
        total_value_including_fees,
        total_value_excluding_fees_eth: total_value_excluding_fees / eth_price,
        total_value_including_fees_eth: total_value_including_fees / eth_price,
        eth_price,
    })
}

fn to_decimal(value: U256, decimals: u8) -> f64 {
    u256_to_f64(value) / 10f64.powi(decimals as i32)
}

fn format_day(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(moment) => moment.format("%a %b %d %Y").to_string(),
        None => timestamp.to_string(),
    }
}

/// The pool snapshot carries both the current tick and the current sqrt
/// price. An indexer serving inconsistent data can report a price outside
/// the tick it claims, which skews the in-range valuation split. That is
/// worth a warning, not a failure.
fn check_price_alignment(pool: &PoolSnapshot) {
    let Ok(at_tick) = tick_math::get_sqrt_ratio_at_tick(pool.tick) else {
        return;
    };
    let next_tick = if pool.tick < MAX_TICK {
        tick_math::get_sqrt_ratio_at_tick(pool.tick + 1).ok()
    } else {
        None
    };

    let misaligned = pool.sqrt_price_x96 < at_tick
        || next_tick.is_some_and(|upper| pool.sqrt_price_x96 >= upper);
    if misaligned {
        warn!(
            tick = pool.tick,
            sqrt_price = %pool.sqrt_price_x96,
            "pool sqrt price sits outside the current tick, valuations may drift"
        );
    }
}
