//! Production adapters implementing the subsystem ports.

pub mod clock;
pub mod http;
pub mod lock;
pub mod ports;
pub mod registry;
pub mod storage;

pub use clock::SystemClock;
pub use http::RestStorefrontClient;
pub use lock::{DataDirLock, LockError};
pub use ports::{
    DispatcherResync, LedgerProductSink, LedgerStockReader, MappingIndexAdapter,
    MappingRefresherAdapter, MappingResolveAdapter,
};
pub use registry::ConfigSiteDirectory;
pub use storage::{RocksDbConfig, RocksDbFailureStore, RocksDbMappingRepository, RocksDbStore};
