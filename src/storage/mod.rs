pub mod database;

pub use database::{ParameterDatabase, SnapshotInfo};
