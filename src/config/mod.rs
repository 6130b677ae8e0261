//! Configuration models for save scheduling.

pub mod saver;

pub use saver::SaverConfig;
