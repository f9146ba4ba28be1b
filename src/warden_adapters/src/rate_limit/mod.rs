pub mod local;
pub mod postgres;

pub use local::LocalRateLimiter;
pub use postgres::PostgresRateLimiter;
