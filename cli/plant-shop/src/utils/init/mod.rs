mod logger;
mod record_store_client;

pub use logger::*;
pub use record_store_client::*;
