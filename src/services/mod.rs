pub mod http;
pub mod logger;
pub mod rate_limiter;
pub mod term_cache;
