/// Re-export `Config` from `adlens-core` for use within this crate.
///
/// All environment-variable parsing lives in `adlens-core` so the aggregation
/// policies it carries can be built without depending on the server.
pub use adlens_core::config::Config;
