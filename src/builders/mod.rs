//! Builders to construct save schedulers from configuration.

pub mod saver_builder;

pub use saver_builder::SaverBuilder;
