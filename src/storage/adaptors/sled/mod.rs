mod sled_event_sink;
mod sled_namespace_registry;

pub use sled_event_sink::*;
pub use sled_namespace_registry::*;


use std::path::Path;

use tracing::debug;
use tracing::warn;

use crate::constants::SLED_DB_DIR;

/// Opens the embedded database holding both the namespace registry and the
/// event store under `sled_db_root_path`.
pub fn init_sled_db(
    sled_db_root_path: impl AsRef<Path> + std::fmt::Debug,
    cache_capacity_bytes: u64,
) -> std::result::Result<::sled::Db, std::io::Error> {
    debug!("init_sled_db from path: {:?}", &sled_db_root_path);

    let db_path = sled_db_root_path.as_ref().join(SLED_DB_DIR);

    ::sled::Config::default()
        .path(&db_path)
        .cache_capacity(cache_capacity_bytes)
        .flush_every_ms(Some(100))
        .use_compression(true)
        .compression_factor(1)
        .open()
        .map_err(|e| {
            warn!(
                "Try to open DB at this location: {:?} and failed: {:?}",
                db_path, e
            );
            std::io::Error::other(e)
        })
}
