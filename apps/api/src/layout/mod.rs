// Layout: text measurement, block rules, the text flow engine, raster surface
// pagination and the table of contents.
// Rasterization and pagination are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod flow;
pub mod font_metrics;
pub mod rules;
pub mod style;
pub mod surface;
pub mod toc;
