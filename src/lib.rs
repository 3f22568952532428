pub mod browser;
pub mod config;
pub mod element;
pub mod error;
pub mod output;
pub mod page;
pub mod scan;

pub use browser::ScanBrowser;
pub use config::{ReadyCondition, ScannerBuilder, ScannerConfig};
pub use error::{Error, Result};
pub use page::Page;
pub use scan::{ImageRef, Performance, ScanResult, Scanner};
