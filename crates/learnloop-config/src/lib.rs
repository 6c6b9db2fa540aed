//! Layered configuration for learnloop.

pub mod config;
mod config_merge;

pub use config::{ExtractConfig, LoopConfig, StorageConfig, TargetsConfig};
