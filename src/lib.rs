#[cfg(feature = "raster")]
pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use error::{RenderError, RenderResult, Warning};
pub use layout::{RouteLayout, compute_hold_index_layout, compute_layout};
pub use render::{output_file_name, render_svg};
