//! Standalone HTML preview page

use super::graphviz::{OutputFormat, RenderError};
use base64::Engine;

/// Wrap an image in a page that embeds it as a data URI
pub fn render_html(image: &[u8], format: OutputFormat, title: &str) -> Result<String, RenderError> {
    if !format.is_embeddable() {
        return Err(RenderError::NotEmbeddable(format));
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(image);
    Ok(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body><img alt=\"{title}\" src=\"data:{mime};base64,{encoded}\"></body>\n</html>\n",
        title = escape_html(title),
        mime = format.mime(),
        encoded = encoded,
    ))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
