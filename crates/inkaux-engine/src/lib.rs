//! inkaux-engine: Inkscape asset helpers
//!
//! This crate provides:
//! - An icon sheet composer that lays out theme icons on preview sheets
//! - WMF export glue around an external converter command
//! - Shared JSON configuration for both

pub mod compose;
pub mod config;
pub mod converter;
pub mod layout;
pub mod sheet;

// Re-export commonly used types
pub use compose::{ComposeError, ComposeReport, Composer, IconEntry, SheetJob, SheetReport};
pub use config::{Config, ConfigError, ConverterConfig, SheetConfig};
pub use converter::{
    export, CommandResolver, ConversionRunner, ConverterError, ExportRequest, PathResolver,
    ShellRunner,
};
pub use layout::{Cell, GridLayout};
pub use sheet::{inject, render_icon, InjectionPoint, SheetError};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
