use crate::ir::{
    Connection, ConnectionPatch, ConnectionStyle, DiagramState, NodeId, NodeStyle,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, trace};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[A-Za-z0-9:_.\-]+|"(?:\\.|[^"\\])*"|\{[^{}]*\}|```|#|\*|[^\w\s{]"#).unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),
    /// A quoted string, already unescaped.
    Text(String),
    /// An inline `{key: value}` record.
    Record(Map<String, Value>),
    Punct(String),
}

impl Token {
    fn from_raw(raw: &str) -> Self {
        if raw.starts_with('"') {
            let text = serde_json::from_str::<String>(raw)
                .unwrap_or_else(|_| raw.trim_matches('"').to_string());
            return Token::Text(text);
        }
        if raw.starts_with('{') {
            return match json5::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Token::Record(map),
                _ => Token::Text(raw.to_string()),
            };
        }
        if raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, ':' | '_' | '.' | '-'))
        {
            Token::Word(raw.to_string())
        } else {
            Token::Punct(raw.to_string())
        }
    }

    /// The verb spelled by this token. Quoted strings and records never are.
    fn verb(&self) -> Option<&str> {
        match self {
            Token::Word(word) => Some(word.as_str()),
            Token::Punct(punct) => Some(punct.as_str()),
            _ => None,
        }
    }

    fn text(&self) -> String {
        match self {
            Token::Word(s) | Token::Text(s) | Token::Punct(s) => s.clone(),
            Token::Record(map) => Value::Object(map.clone()).to_string(),
        }
    }

    fn node_id(&self) -> Option<NodeId> {
        match self {
            Token::Word(s) | Token::Text(s) if !s.is_empty() => Some(NodeId::new(s.as_str())),
            _ => None,
        }
    }
}

pub fn tokenize(line: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(line)
        .map(|m| Token::from_raw(m.as_str()))
        .collect()
}

/// Replays every line of `text` from an empty state.
pub fn interpret_text(text: &str) -> DiagramState {
    let mut state = DiagramState::default();
    replay(&mut state, text);
    state
}

pub fn replay(state: &mut DiagramState, text: &str) {
    for line in text.lines() {
        interpret(state, line);
    }
}

/// Applies one command line. Malformed or partial input is a no-op.
pub fn interpret(state: &mut DiagramState, line: &str) {
    if state.in_code_block {
        state.markup.push(line.to_string());
        if line.trim_start().starts_with("```") {
            state.in_code_block = false;
        }
        return;
    }

    let tokens = tokenize(line);
    let Some(verb) = tokens.first().and_then(Token::verb) else {
        return;
    };
    let args = &tokens[1..];
    trace!(verb, args = args.len(), "interpret");

    match verb {
        "add" => {
            state.drawing_opacity = 1.0;
            if let Some(id) = args.first().and_then(Token::node_id) {
                let style = node_style(&args[1..]);
                create_node(state, &id, &style);
            }
        }
        "edit" => {
            state.drawing_opacity = 1.0;
            if let Some(id) = args.first().and_then(Token::node_id) {
                let style = node_style(&args[1..]);
                if !state.contains(id.as_str()) {
                    create_node(state, &id, &NodeStyle::default());
                }
                if let Some(node) = state.nodes.get_mut(&id) {
                    style.apply(node);
                    state.editing = id;
                }
            }
        }
        "zoom" => {
            state.drawing_opacity = 1.0;
            if let Some(id) = args.first().and_then(Token::node_id) {
                let style = node_style(&args[1..]);
                if !state.contains(id.as_str()) {
                    create_node(state, &id, &NodeStyle::default());
                }
                zoom_node(state, &id, &style);
            }
        }
        "up" => {
            state.drawing_opacity = 1.0;
            let parent = state
                .parent_of(state.focus.as_str())
                .cloned()
                .unwrap_or_else(NodeId::root);
            zoom_node(state, &parent, &NodeStyle::default());
        }
        "delete" => {
            state.drawing_opacity = 1.0;
            match args.first().and_then(Token::node_id) {
                Some(id) if !id.is_root() => state.detach(id.as_str()),
                _ => debug!("delete without a detachable id"),
            }
        }
        "line" | "arrow" => {
            state.drawing_opacity = 1.0;
            let style = ConnectionStyle::from_token(verb).unwrap_or(ConnectionStyle::Line);
            let from = args.first().and_then(Token::node_id);
            let to = args.get(1).and_then(Token::node_id);
            if let (Some(from), Some(to)) = (from, to) {
                for id in [&from, &to] {
                    if !state.contains(id.as_str()) {
                        create_node(state, id, &NodeStyle::default());
                    }
                }
                connect_nodes(state, style, &from, &to, &args[2..]);
            }
        }
        "disconnect" => {
            state.drawing_opacity = 1.0;
            let from = args.first().and_then(Token::node_id);
            let to = args.get(1).and_then(Token::node_id);
            if let (Some(from), Some(to)) = (from, to) {
                disconnect_nodes(state, &from, &to);
            }
        }
        "slide" => state.drawing_opacity = 0.0,
        "drawing" => state.drawing_opacity = 1.0,
        "#" => {
            state.drawing_opacity = 0.0;
            state.markup = vec![line.to_string()];
        }
        "*" => {
            state.drawing_opacity = 0.0;
            state.markup.push(line.to_string());
        }
        "```" => {
            state.drawing_opacity = 0.0;
            state.markup.push(line.to_string());
            state.in_code_block = true;
        }
        other => trace!(verb = other, "ignoring unknown verb"),
    }
}

/// Reads `key value` pairs; a record argument contributes all of its entries.
fn style_pairs(args: &[Token]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut iter = args.iter();
    while let Some(token) = iter.next() {
        if let Token::Record(map) = token {
            for (key, value) in map {
                pairs.push((key.clone(), json_text(value)));
            }
            continue;
        }
        match iter.next() {
            Some(value) => pairs.push((token.text(), value.text())),
            None => debug!(key = %token.text(), "style key without a value"),
        }
    }
    pairs
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn node_style(args: &[Token]) -> NodeStyle {
    let mut style = NodeStyle::default();
    for (key, value) in style_pairs(args) {
        if !style.set(&key, value) {
            debug!(key, "ignoring unknown node style");
        }
    }
    style
}

fn connection_patch(args: &[Token]) -> ConnectionPatch {
    let mut patch = ConnectionPatch::default();
    if let [single] = args
        && !matches!(single, Token::Record(_))
    {
        patch.stroke = Some(single.text());
        return patch;
    }
    for (key, value) in style_pairs(args) {
        if !patch.set(&key, value) {
            debug!(key, "ignoring unknown connection style");
        }
    }
    patch
}

/// Attaches `id` as the last child of the editing node, creating it if
/// needed. Any previous parent loses it first.
fn create_node(state: &mut DiagramState, id: &NodeId, style: &NodeStyle) {
    if id.is_root() {
        return;
    }
    let parent = state.editing.clone();
    let creates_cycle = state.contains(id.as_str())
        && state.is_ancestor_or_self(id.as_str(), parent.as_str());
    if creates_cycle {
        debug!(%id, %parent, "refusing to attach a node beneath itself");
    } else {
        state.detach(id.as_str());
        state.ensure_node(id);
        if let Some(parent) = state.nodes.get_mut(&parent) {
            parent.children.push(id.clone());
        }
    }
    style.apply(state.ensure_node(id));
}

fn zoom_node(state: &mut DiagramState, id: &NodeId, style: &NodeStyle) {
    if let Some(node) = state.nodes.get_mut(id) {
        style.apply(node);
        state.focus = id.clone();
        state.editing = id.clone();
    }
}

fn connect_nodes(
    state: &mut DiagramState,
    style: ConnectionStyle,
    from: &NodeId,
    to: &NodeId,
    args: &[Token],
) {
    let mut connection = Connection::new(style);
    connection_patch(args).apply(&mut connection);
    connection.stroke_index = state.stroke_index(&connection.stroke);
    if let Some(node) = state.nodes.get_mut(from) {
        node.connections.insert(to.clone(), connection);
    }
}

fn disconnect_nodes(state: &mut DiagramState, from: &NodeId, to: &NodeId) {
    if let Some(node) = state.nodes.get_mut(from) {
        node.connections.remove(to);
    }
    if let Some(node) = state.nodes.get_mut(to) {
        node.connections.remove(from);
    }
}
