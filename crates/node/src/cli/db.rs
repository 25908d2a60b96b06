use serde::{Deserialize, Serialize};
use tp_chain_config::StorePageWindow;

/// Parameters used to config the document store connection.
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct DbParams {
    /// Connection string of the document database holding chain state.
    #[clap(env = "TREBUCHET_DB_URL", long, default_value = "mongodb://127.0.0.1:27017", value_name = "URL")]
    pub db_url: String,

    /// Database name.
    #[clap(env = "TREBUCHET_DB_NAME", long, default_value = "catapult", value_name = "NAME")]
    pub db_name: String,

    /// Lower clamp applied by the store adapter to every paged query.
    #[clap(env = "TREBUCHET_DB_PAGE_SIZE_MIN", long, default_value_t = 10)]
    pub db_page_size_min: u64,

    /// Upper clamp applied by the store adapter to every paged query.
    #[clap(env = "TREBUCHET_DB_PAGE_SIZE_MAX", long, default_value_t = 4096)]
    pub db_page_size_max: u64,
}

impl DbParams {
    pub fn store_page_window(&self) -> StorePageWindow {
        StorePageWindow { min: self.db_page_size_min, max: self.db_page_size_max }
    }
}
