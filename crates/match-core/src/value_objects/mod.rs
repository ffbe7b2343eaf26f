//! Value objects - immutable types that represent domain concepts

mod pair_key;
mod snowflake;

pub use pair_key::PairKey;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
