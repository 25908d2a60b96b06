use anyhow::Context;
use serde::{Deserialize, Serialize};
use tp_chain_config::{CountRange, PageSizeGrid};
use tp_types::Network;

/// Parameters selecting the network and the list-endpoint limit regimes.
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct ChainParams {
    /// Network served by this gateway; selects the address prefix used when
    /// converting public keys to addresses.
    #[clap(env = "TREBUCHET_NETWORK", long, default_value = "mainnet", value_name = "NETWORK")]
    pub network: String,

    /// Smallest valid limit of the block-range endpoint.
    #[clap(env = "TREBUCHET_PAGE_SIZE_MIN", long, default_value_t = 30)]
    pub page_size_min: u64,

    /// Largest valid limit of the block-range endpoint.
    #[clap(env = "TREBUCHET_PAGE_SIZE_MAX", long, default_value_t = 80)]
    pub page_size_max: u64,

    /// Grid step of valid block-range limits between min and max.
    #[clap(env = "TREBUCHET_PAGE_SIZE_STEP", long, default_value_t = 5)]
    pub page_size_step: u64,

    /// Smallest limit accepted by cursor endpoints.
    #[clap(env = "TREBUCHET_COUNT_RANGE_MIN", long, default_value_t = 10)]
    pub count_range_min: u64,

    /// Largest limit accepted by cursor endpoints.
    #[clap(env = "TREBUCHET_COUNT_RANGE_MAX", long, default_value_t = 100)]
    pub count_range_max: u64,

    /// Limit cursor endpoints redirect to when the requested one is out of
    /// range.
    #[clap(env = "TREBUCHET_COUNT_RANGE_PRESET", long, default_value_t = 25)]
    pub count_range_preset: u64,
}

impl ChainParams {
    pub fn network(&self) -> anyhow::Result<Network> {
        Network::from_name(&self.network).with_context(|| format!("Unknown network `{}`", self.network))
    }

    pub fn page_size(&self) -> PageSizeGrid {
        PageSizeGrid { min: self.page_size_min, max: self.page_size_max, step: self.page_size_step }
    }

    pub fn count_range(&self) -> CountRange {
        CountRange { min: self.count_range_min, max: self.count_range_max, preset: self.count_range_preset }
    }
}
