// file: src/repository/mod.rs
// description: Source tree discovery and classification module exports
// reference: Internal module structure

pub mod classifier;
pub mod scanner;

pub use classifier::{FrameworkClassifier, RouteInfo, WebFramework};
pub use scanner::{FileScanner, ScannedFile};
