use std::path::Path;

use serde::Serialize;

/// One report line: the position's economics at a single block.
///
/// Serialized field order is the CSV column order, so new columns go at the
/// end to keep existing spreadsheets importable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRow {
    pub date: String,
    pub price0: f64,
    pub price1: f64,
    pub name0: String,
    pub name1: String,
    /// Lifetime fees per token, unclaimed plus already collected, in whole
    /// token units.
    pub fees0: f64,
    pub fees1: f64,
    #[serde(rename = "totalFeeValue")]
    pub total_fee_value: f64,
    pub amount0: f64,
    pub amount1: f64,
    #[serde(rename = "totalValueExcludingFees")]
    pub total_value_excluding_fees: f64,
    #[serde(rename = "totalValueIncludingFees")]
    pub total_value_including_fees: f64,
    #[serde(rename = "totalValueExcludingFees_eth")]
    pub total_value_excluding_fees_eth: f64,
    #[serde(rename = "totalValueIncludingFees_eth")]
    pub total_value_including_fees_eth: f64,
    #[serde(rename = "ethPrice")]
    pub eth_price: f64,
}

/// Column names in serialization order, written explicitly so a report with
/// no rows still carries its header line.
const HEADER: [&str; 15] = [
    "date",
    "price0",
    "price1",
    "name0",
    "name1",
    "fees0",
    "fees1",
    "totalFeeValue",
    "amount0",
    "amount1",
    "totalValueExcludingFees",
    "totalValueIncludingFees",
    "totalValueExcludingFees_eth",
    "totalValueIncludingFees_eth",
    "ethPrice",
];

pub fn write_csv(path: &Path, rows: &[PositionRow]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
