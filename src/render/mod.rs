//! Graph output: DOT text, Graphviz images and HTML previews

mod dot;
mod graphviz;
mod html;

pub use dot::{DotOptions, RANKDIRS, default_title, render_dot};
pub use graphviz::{GraphvizRenderer, OutputFormat, RenderError};
pub use html::render_html;
