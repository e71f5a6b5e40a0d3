pub mod client;
pub mod errors;
pub mod pipeline;
pub mod repositories;
pub mod schema;
pub mod unit_of_work;

pub use client::DbClient;
pub use errors::{DbError, PipelineError};
pub use pipeline::authorize;
pub use unit_of_work::UnitOfWork;
