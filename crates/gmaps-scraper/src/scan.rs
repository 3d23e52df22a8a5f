//! Heuristic block scanner over the embedded application state.
//!
//! Walks an arbitrary JSON structure depth-first and runs the field
//! classifier on every string leaf. Strings carrying the `)]}'` anti-hijack
//! prefix hold nested JSON payloads; they are decoded and walked in place
//! rather than classified.

use serde_json::{Map, Value};

use crate::capture::strip_xssi_prefix;
use crate::classify::{self, Token};
use crate::types::{CandidateSet, FieldCandidate, FieldKind, Source};

/// Nested payload strings are decoded at most this many levels deep.
const MAX_EMBED_DEPTH: usize = 4;

/// Node shapes the scanner distinguishes.
enum Node<'a> {
    Leaf(&'a str),
    Seq(&'a [Value]),
    Map(&'a Map<String, Value>),
    Scalar,
}

impl<'a> Node<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Node::Leaf(s),
            Value::Array(items) => Node::Seq(items),
            Value::Object(map) => Node::Map(map),
            Value::Null | Value::Bool(_) | Value::Number(_) => Node::Scalar,
        }
    }
}

/// Scan one node. Never fails; unmatched or malformed branches simply
/// contribute no candidates.
#[must_use]
pub fn scan(node: &Value) -> CandidateSet {
    let mut set = CandidateSet::default();
    walk(node, &mut set, 0);
    set
}

/// Scan several blocks as a single traversal, in iteration order.
pub fn scan_blocks<'a, I>(blocks: I) -> CandidateSet
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut set = CandidateSet::default();
    for block in blocks {
        walk(block, &mut set, 0);
    }
    set
}

fn walk(root: &Value, set: &mut CandidateSet, embed_depth: usize) {
    // Explicit stack so hostile nesting cannot exhaust the call stack.
    let mut stack: Vec<&Value> = vec![root];

    while let Some(value) = stack.pop() {
        match Node::of(value) {
            Node::Leaf(text) => visit_leaf(text, set, embed_depth),
            Node::Seq(items) => stack.extend(items.iter().rev()),
            Node::Map(map) => stack.extend(map.values().rev()),
            Node::Scalar => {}
        }
    }
}

fn visit_leaf(text: &str, set: &mut CandidateSet, embed_depth: usize) {
    if let Some(payload) = strip_xssi_prefix(text) {
        if embed_depth >= MAX_EMBED_DEPTH {
            return;
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(decoded) => walk(&decoded, set, embed_depth + 1),
            Err(e) => tracing::debug!(error = %e, "skipping undecodable embedded payload"),
        }
        return;
    }

    let Some(token) = Token::new(text) else {
        return;
    };
    for kind in FieldKind::ALL {
        if classify::matches(&token, kind) {
            set.push(FieldCandidate {
                kind,
                source: Source::Scan,
                text: token.text().to_string(),
            });
        }
    }
}
