pub mod animate;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod icons;
pub mod ir;
pub mod layout;
pub mod parser;
pub mod render;
pub mod theme;
pub mod transition;
pub mod visibility;

#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{DepictError, Result};
pub use frame::Frame;
pub use transition::{Session, Transition};
