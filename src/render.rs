use crate::config::RenderConfig;
use crate::error::{DepictError, Result};
use crate::frame::{Frame, FrameConnector, FrameNode};
use crate::ir::ConnectionStyle;
use crate::theme::Theme;
use std::fmt::Write as _;
use std::path::Path;

pub fn render_svg(frame: &Frame, theme: &Theme, render_cfg: &RenderConfig) -> String {
    let width = render_cfg.width.max(frame.width);
    let height = render_cfg.height.max(frame.height);
    let mut svg = String::new();

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );

    svg.push_str("<defs>");
    for (idx, stroke) in frame.strokes.iter().enumerate() {
        let _ = write!(
            svg,
            "<marker id=\"head-{idx}\" markerWidth=\"5\" markerHeight=\"7\" refX=\"5\" refY=\"2.5\" orient=\"auto\"><path d=\"M 0 0 L 5 2.5 L 0 5 z\" fill=\"{}\"/></marker>",
            escape_xml(stroke)
        );
    }
    svg.push_str("</defs>");

    let _ = write!(
        svg,
        "<g id=\"drawing\" opacity=\"{:.3}\">",
        frame.drawing_opacity
    );
    for node in &frame.nodes {
        svg.push_str(&node_svg(node, theme));
    }
    for connector in &frame.connectors {
        svg.push_str(&connector_svg(connector, theme, width));
    }
    svg.push_str("</g></svg>");
    svg
}

fn node_svg(node: &FrameNode, theme: &Theme) -> String {
    let g = &node.geometry;
    let mut out = String::new();
    let _ = write!(out, "<g opacity=\"{:.3}\">", node.opacity);

    if !node.title.is_empty() && g.title_width > 0.0 && g.title_height > 0.0 {
        let font_size = (g.title_width / 8.0).min(g.title_height / 2.0);
        let _ = write!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" opacity=\"{:.3}\" font-family=\"{}\" font-size=\"{font_size:.2}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
            g.title_x + g.title_width / 2.0,
            g.title_y + g.title_height / 2.0,
            g.title_opacity,
            theme.font_family,
            theme.text_color,
            escape_xml(&node.title)
        );
    }

    if !node.icon.is_empty() && g.icon_width > 0.0 {
        let _ = write!(
            out,
            "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" opacity=\"{:.3}\"/>",
            escape_xml(&node.icon),
            g.icon_x,
            g.icon_y,
            g.icon_width,
            g.icon_width,
            g.icon_opacity
        );
    }

    let stroke = escape_xml(&node.stroke);
    let _ = write!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" opacity=\"{:.3}\" stroke=\"{stroke}\" stroke-width=\"{}\" fill-opacity=\"0\"/>",
        g.x,
        g.y,
        g.width,
        g.height,
        g.width.min(g.height) / 40.0,
        g.box_opacity,
        theme.box_stroke_width
    );
    let _ = write!(
        out,
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" opacity=\"{:.3}\" stroke=\"{stroke}\" stroke-dasharray=\"{}\"/>",
        g.x,
        g.y,
        g.x,
        g.y + g.height,
        g.left_opacity,
        theme.separator_dasharray
    );
    let _ = write!(
        out,
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" opacity=\"{:.3}\" stroke=\"{stroke}\" stroke-dasharray=\"{}\"/>",
        g.x,
        g.y,
        g.x + g.width,
        g.y,
        g.top_opacity,
        theme.separator_dasharray
    );
    out.push_str("</g>");
    out
}

fn connector_svg(connector: &FrameConnector, theme: &Theme, canvas_width: f32) -> String {
    let path = &connector.path;
    let mut out = String::new();

    if let (Some(label), Some(text)) = (&path.label, &connector.label) {
        let font_size = canvas_width / 60.0;
        let _ = write!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" opacity=\"{:.3}\"/>",
            label.x - text.chars().count() as f32 * font_size * 0.3,
            label.y - font_size * 0.6,
            text.chars().count() as f32 * font_size * 0.6,
            font_size * 1.2,
            theme.label_background,
            connector.opacity
        );
        let _ = write!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" opacity=\"{:.3}\" font-family=\"{}\" font-size=\"{font_size:.2}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
            label.x,
            label.y,
            connector.opacity,
            theme.font_family,
            theme.text_color,
            escape_xml(text)
        );
    }

    let _ = write!(
        out,
        "<path d=\"M {} {} A {} {} 0 0 0 {} {}\" stroke=\"{}\" opacity=\"{:.3}\" stroke-width=\"{}\" fill-opacity=\"0\"",
        path.start.x,
        path.start.y,
        path.radius,
        path.radius,
        path.end.x,
        path.end.y,
        escape_xml(&connector.stroke),
        connector.opacity * theme.connector_opacity,
        theme.connector_width
    );
    if connector.stroke_index > 0 {
        let _ = write!(
            out,
            " stroke-dasharray=\"{} 5\"",
            connector.stroke_index * 5
        );
    }
    if connector.style == ConnectionStyle::Arrow {
        let _ = write!(out, " marker-end=\"url(#head-{})\"", connector.stroke_index);
    }
    out.push_str("/>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, svg).map_err(|source| DepictError::Write {
            path: path.to_path_buf(),
            source,
        })?,
        None => print!("{svg}"),
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(opt.default_size);

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|err| DepictError::Raster(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| DepictError::Raster("failed to allocate pixmap".to_string()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .save_png(output)
        .map_err(|err| DepictError::Raster(err.to_string()))?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
