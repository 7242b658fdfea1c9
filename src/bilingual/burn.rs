use std::path::Path;

use super::style::{LayerStyle, StylePair};

/// Escape a file path for use inside a quoted filter-graph argument
///
/// Backslashes become forward slashes, `:` is escaped since it separates
/// filter options, and single quotes are closed, escaped and reopened.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "'\\''")
}

fn force_style(styles: &StylePair, layer: &LayerStyle) -> String {
    format!(
        "FontName={},FontSize={},PrimaryColour={},Alignment={},MarginV={}",
        styles.font_name.replace(',', " "),
        layer.font_size,
        layer.colour,
        styles.alignment,
        layer.margin_v
    )
}

fn subtitles_stage(path: &Path, styles: &StylePair, layer: &LayerStyle) -> String {
    format!(
        "subtitles='{}':force_style='{}'",
        escape_filter_path(path),
        force_style(styles, layer)
    )
}

/// Build the `-vf` expression that renders one or two subtitle files
///
/// Each file gets its own `subtitles=` stage with the layer's style. The
/// primary stage sits higher (larger MarginV) so the two lines stack without
/// colliding. Stages are chained with `,`.
pub fn build_filter(primary: &Path, secondary: Option<&Path>, styles: &StylePair) -> String {
    let primary_stage = subtitles_stage(primary, styles, &styles.primary);

    match secondary {
        Some(secondary) => format!(
            "{},{}",
            primary_stage,
            subtitles_stage(secondary, styles, &styles.secondary)
        ),
        None => primary_stage,
    }
}
