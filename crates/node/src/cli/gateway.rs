use clap::Args;
use serde::{Deserialize, Serialize};
use tc_gateway_server::service::GatewayServerConfig;

/// Port the gateway binds when none is configured.
pub const GATEWAY_DEFAULT_PORT: u16 = 3000;

/// Gateway server options.
#[derive(Debug, Clone, Args, Deserialize, Serialize)]
pub struct GatewayParams {
    /// Bind the gateway on every interface rather than loopback only,
    /// which usually makes it reachable from outside the host.
    #[arg(env = "TREBUCHET_GATEWAY_EXTERNAL", long)]
    pub gateway_external: bool,

    /// Port the gateway listens on.
    #[arg(env = "TREBUCHET_GATEWAY_PORT", long, value_name = "PORT", default_value_t = GATEWAY_DEFAULT_PORT)]
    pub gateway_port: u16,
}

impl GatewayParams {
    pub fn as_gateway_server_config(&self) -> GatewayServerConfig {
        GatewayServerConfig { gateway_external: self.gateway_external, gateway_port: self.gateway_port }
    }
}
