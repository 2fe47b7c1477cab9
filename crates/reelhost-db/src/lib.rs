//! Video record persistence.
//!
//! [`VideoRepository`] is the only seam the upload flows use. `PgVideoRepository`
//! backs it with Postgres; `InMemoryVideoRepository` is used for local development
//! without a database and in tests.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryVideoRepository;
pub use postgres::{connect, run_migrations, PgVideoRepository};
pub use traits::VideoRepository;
