use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

pub mod types;

use types::{CreationData, GraphResponse, MetaData, PoolsData, PositionSnapshotBundle, PositionsData};

/// Gateway URL template. `{api_key}` is substituted before the client is built.
pub const DEFAULT_GATEWAY_URL: &str =
    "https://gateway.thegraph.com/api/{api_key}/subgraphs/id/0x9bde7bf4d5b13ef94373ced7c8ee0be59735a298-2";

// Mainnet USDC/WETH 0.3% pool, used as the USD <-> ETH price reference.
const USDC_ADDRESS: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
const WETH_ADDRESS: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum SubgraphError {
    #[error("subgraph request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("subgraph query returned errors: {0}")]
    Query(String),
    #[error("subgraph response is missing {0}")]
    MissingField(&'static str),
    #[error("subgraph returned an unparseable {field}: {value:?}")]
    InvalidData { field: &'static str, value: String },
}

/// Thin GraphQL client over the exchange's subgraph. Every read can be pinned
/// to a historical block, which the graph node serves from its archive.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>) -> Result<Self, SubgraphError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Full snapshot of a position at the given block, or at the chain head
    /// when `block` is `None`.
    ///
    /// `Ok(None)` means the subgraph holds no data for the position at that
    /// block, which callers should treat as "nothing to report", not as a
    /// failure.
    pub async fn position_snapshot(
        &self,
        position_id: u64,
        block: Option<u64>,
    ) -> Result<Option<PositionSnapshotBundle>, SubgraphError> {
        let data: PositionsData = self.query(&position_query(position_id, block)).await?;
        match data.positions.into_iter().next() {
            Some(dto) => Ok(Some(dto.into_bundle()?)),
            None => Ok(None),
        }
    }

    /// Block in which the position NFT was minted, or `None` for an unknown id.
    pub async fn creation_block(&self, position_id: u64) -> Result<Option<u64>, SubgraphError> {
        let data: CreationData = self.query(&creation_query(position_id)).await?;
        match data.positions.into_iter().next() {
            Some(dto) => Ok(Some(types::parse_u64(
                "transaction.blockNumber",
                &dto.transaction.block_number,
            )?)),
            None => Ok(None),
        }
    }

    /// USD price of one ETH, read from the reference pool's token0Price.
    pub async fn eth_price_usd(&self, block: Option<u64>) -> Result<f64, SubgraphError> {
        let data: PoolsData = self.query(&eth_price_query(block)).await?;
        let pool = data
            .pools
            .into_iter()
            .next()
            .ok_or(SubgraphError::MissingField("pools"))?;
        types::parse_f64("pool.token0Price", &pool.token0_price)
    }

    /// Newest block the subgraph has indexed.
    pub async fn head_block(&self) -> Result<u64, SubgraphError> {
        let data: MetaData = self.query(META_QUERY).await?;
        Ok(data.meta.block.number)
    }

    async fn query<T: DeserializeOwned>(&self, document: &str) -> Result<T, SubgraphError> {
        debug!(query = document, "posting subgraph query");
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "query": document }))
            .send()
            .await?;
        let body: GraphResponse<T> = response.json().await?;

        if !body.errors.is_empty() {
            let joined = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SubgraphError::Query(joined));
        }
        body.data.ok_or(SubgraphError::MissingField("data"))
    }
}

fn block_clause(block: Option<u64>) -> String {
    match block {
        Some(number) => format!(", block: {{number: {number}}}"),
        None => String::new(),
    }
}

fn position_query(position_id: u64, block: Option<u64>) -> String {
    format!(
        r#"query {{
  positions(where: {{id: "{id}"}}{block}) {{
    token0 {{
      name
      decimals
      tokenDayData(orderBy: date, orderDirection: desc, first: 1) {{
        priceUSD
        date
      }}
    }}
    token1 {{
      name
      decimals
      tokenDayData(orderBy: date, orderDirection: desc, first: 1) {{
        priceUSD
        date
      }}
    }}
    liquidity
    feeGrowthInside0LastX128
    feeGrowthInside1LastX128
    collectedFeesToken0
    collectedFeesToken1
    pool {{
      feeGrowthGlobal0X128
      feeGrowthGlobal1X128
      tick
      sqrtPrice
      feeTier
    }}
    tickLower {{
      tickIdx
      feeGrowthOutside0X128
      feeGrowthOutside1X128
    }}
    tickUpper {{
      tickIdx
      feeGrowthOutside0X128
      feeGrowthOutside1X128
    }}
  }}
}}"#,
        id = position_id,
        block = block_clause(block),
    )
}

fn creation_query(position_id: u64) -> String {
    format!(
        r#"query {{
  positions(where: {{id: "{id}"}}) {{
    transaction {{
      blockNumber
    }}
  }}
}}"#,
        id = position_id,
    )
}

fn eth_price_query(block: Option<u64>) -> String {
    format!(
        r#"query {{
  pools(where: {{token0: "{usdc}", token1: "{weth}", feeTier: "3000"}}{block}) {{
    token0Price
  }}
}}"#,
        usdc = USDC_ADDRESS,
        weth = WETH_ADDRESS,
        block = block_clause(block),
    )
}

const META_QUERY: &str = r#"query {
  _meta {
    block {
      number
    }
  }
}"#;
