//! Backend UI theme: asset composition and view provisioning.

pub mod assets;
pub mod config;
pub mod manager;

pub use assets::AssetBuilder;
pub use config::AppUiConfig;
pub use manager::AppUiRunner;
