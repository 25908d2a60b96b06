//! Gateway-facing chain configuration: the network the node serves, the
//! well-known namespace ids, and the two limit regimes applied to list
//! endpoints.

use serde::{Deserialize, Serialize};
use tp_types::{Network, NamespaceId};

mod paging;

pub use paging::{CountRange, PageSizeGrid, StorePageWindow};

/// Namespace id whose alias designates the network currency mosaic.
pub const CURRENCY_NAMESPACE_ID: NamespaceId = NamespaceId(0x85BB_EA6C_C462_B244);

/// Namespace id whose alias designates the harvesting mosaic.
pub const HARVEST_NAMESPACE_ID: NamespaceId = NamespaceId(0x9412_99B2_B7E1_291C);

/// Static configuration shared by the storage backend and the gateway
/// server. Built once at startup from the CLI and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network whose address prefix is used for public-key conversion.
    pub network: Network,
    /// Valid-limit grid for the block-range endpoint.
    pub page_size: PageSizeGrid,
    /// Accepted range and redirect preset for cursor endpoints.
    pub count_range: CountRange,
    /// Clamp window applied by the store adapter to every paged find.
    pub store_page_window: StorePageWindow,
}

impl ChainConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            page_size: PageSizeGrid::default(),
            count_range: CountRange::default(),
            store_page_window: StorePageWindow::default(),
        }
    }
}
