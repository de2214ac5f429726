//! Value objects - immutable types that represent domain concepts

mod permissions;
pub mod schedule;
mod snowflake;

pub use permissions::{OverwriteTarget, PermissionOverwrite, Permissions};
pub use snowflake::{Snowflake, SnowflakeParseError};
