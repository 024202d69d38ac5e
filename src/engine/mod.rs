pub mod buffer_pool;
pub mod cache;
pub mod dual_mode;
pub mod frame_rate;

pub use buffer_pool::{BufferPool, PoolStats, PooledBuffer};
pub use cache::{AnalysisCache, CacheKey, CacheStats, HotCache};
pub use dual_mode::{ColorAnalysis, DualModeEngine, EngineStats};
pub use frame_rate::{FrameRateController, FrameStats};
