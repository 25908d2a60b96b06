mod chain;
mod db;
mod gateway;

pub use chain::ChainParams;
pub use db::DbParams;
pub use gateway::GatewayParams;

use clap::Parser;
use tp_chain_config::ChainConfig;

/// Read-only REST gateway for a Trebuchet chain node.
#[derive(Debug, Clone, Parser)]
#[clap(name = "trebuchet")]
pub struct RunCmd {
    #[clap(flatten)]
    pub db_params: DbParams,

    #[clap(flatten)]
    pub gateway_params: GatewayParams,

    #[clap(flatten)]
    pub chain_params: ChainParams,
}

impl RunCmd {
    pub fn chain_config(&self) -> anyhow::Result<ChainConfig> {
        Ok(ChainConfig {
            network: self.chain_params.network()?,
            page_size: self.chain_params.page_size(),
            count_range: self.chain_params.count_range(),
            store_page_window: self.db_params.store_page_window(),
        })
    }
}
