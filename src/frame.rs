use crate::error::{DepictError, Result};
use crate::ir::{ConnectionStyle, NodeId};
use crate::layout::{ConnectorPath, Layout, NodeGeometry, route};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Everything a renderer draws for one tick, flattened out of a laid-out
/// snapshot with connectors already routed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub drawing_opacity: f32,
    pub strokes: Vec<String>,
    pub nodes: Vec<FrameNode>,
    pub connectors: Vec<FrameConnector>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameNode {
    pub id: NodeId,
    pub title: String,
    pub icon: String,
    pub stroke: String,
    pub opacity: f32,
    #[serde(flatten)]
    pub geometry: NodeGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameConnector {
    pub from: NodeId,
    pub to: NodeId,
    pub style: ConnectionStyle,
    pub stroke: String,
    pub stroke_index: usize,
    pub opacity: f32,
    pub label: Option<String>,
    pub path: ConnectorPath,
}

impl Frame {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| FrameNode {
                id: node.id.clone(),
                title: node.title.clone(),
                icon: node.icon.clone(),
                stroke: node.stroke.clone(),
                opacity: node.opacity,
                geometry: node.geometry,
            })
            .collect();

        let mut connectors = Vec::new();
        for (from_id, from) in &layout.nodes {
            for (to_id, connection) in &from.connections {
                let Some(to) = layout.nodes.get(to_id) else {
                    continue;
                };
                let Some(path) = route(from.geometry.rect(), to.geometry.rect(), connection)
                else {
                    tracing::trace!(from = %from_id, to = %to_id, "connector not routable");
                    continue;
                };
                connectors.push(FrameConnector {
                    from: from_id.clone(),
                    to: to_id.clone(),
                    style: connection.style,
                    stroke: connection.stroke.clone(),
                    stroke_index: connection.stroke_index,
                    opacity: connection.opacity,
                    label: connection.label.clone(),
                    path,
                });
            }
        }

        Frame {
            width: layout.width,
            height: layout.height,
            drawing_opacity: layout.drawing_opacity,
            strokes: layout.strokes.clone(),
            nodes,
            connectors,
        }
    }
}

/// Writes the frame as pretty JSON to `path`, or to stdout when `None`.
pub fn write_frame_dump(path: Option<&Path>, frame: &Frame) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| DepictError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            write_json(BufWriter::new(file), path, frame)
        }
        None => write_json(io::stdout().lock(), Path::new("<stdout>"), frame),
    }
}

fn write_json(mut writer: impl Write, path: &Path, frame: &Frame) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, frame)?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|source| DepictError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::icons::BlankIcons;
    use crate::layout::{Rect, compute_layout};
    use crate::parser::interpret_text;
    use crate::visibility::filter_visible;

    fn frame_of(text: &str) -> Frame {
        let scene = filter_visible(&interpret_text(text));
        let layout = compute_layout(
            &scene,
            Rect::new(0.0, 0.0, 1200.0, 800.0),
            &BlankIcons,
            &LayoutConfig::default(),
        );
        Frame::from_layout(&layout)
    }

    #[test]
    fn flattens_nodes_and_routes_connectors() {
        let frame = frame_of("add a\nadd b\narrow a b stroke red label calls");
        let ids: Vec<&str> = frame.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "top"]);
        assert_eq!(frame.connectors.len(), 1);
        let connector = &frame.connectors[0];
        assert_eq!(connector.from.as_str(), "a");
        assert_eq!(connector.to.as_str(), "b");
        assert_eq!(connector.stroke, "red");
        assert_eq!(connector.stroke_index, 1);
        assert!(connector.path.label.is_some());
        assert_eq!(frame.strokes, vec!["black", "red"]);
    }

    #[test]
    fn self_connections_are_omitted() {
        let frame = frame_of("add a\nline a a");
        assert!(frame.connectors.is_empty());
    }

    #[test]
    fn dump_is_json_with_flattened_geometry() {
        let frame = frame_of("add a");
        let value = serde_json::to_value(&frame).expect("serializable");
        let node = &value["nodes"][0];
        assert_eq!(node["id"], "a");
        assert!(node["x"].is_number());
        assert!(node["box_opacity"].is_number());
    }

    /// Accepts every byte, then fails when asked to flush them.
    #[derive(Default)]
    struct FailingFlush {
        accepted: Vec<u8>,
    }

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.accepted.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
        }
    }

    #[test]
    fn output_failures_after_encoding_are_reported() {
        let frame = frame_of("add a");
        let mut sink = FailingFlush::default();
        let err = write_json(&mut sink, Path::new("<stdout>"), &frame).unwrap_err();
        assert!(matches!(err, DepictError::Write { .. }));
        assert!(sink.accepted.ends_with(b"}\n"));
    }

    #[test]
    fn dump_writes_to_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.json");
        write_frame_dump(Some(&path), &frame_of("add a")).expect("dump");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert!(text.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["nodes"][0]["id"], "a");
    }
}
