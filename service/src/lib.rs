mod error;
mod mutation;
mod params;
mod query;
mod validate;

pub use error::*;
pub use mutation::*;
pub use params::*;
pub use query::*;
pub use validate::*;

pub use sea_orm;
