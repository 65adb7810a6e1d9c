/*!
Adapts host values into [`treediff_core`] trees.

Map keys, list elements, and leaves are recognised the same way the
reference builder recognises them: integers and strings become leaves,
arrays become lists, objects become maps (sorted by key), and anything else
(`null`, booleans, floats) is rejected with an error rather than silently
coerced, since treediff-core has no node shape to represent them.
*/

mod error;

pub use error::BuildError;

use serde_json::Value;
use treediff_core::{Node, NodeRef};

/// Builds a tree from a [`serde_json::Value`]. Fails if the value (or any
/// value nested inside it) is not an integer, string, array, or object.
pub fn build_tree(value: &Value) -> Result<NodeRef, BuildError> {
    match value {
        Value::String(s) => Ok(Node::leaf_str(s.clone())),
        Value::Number(n) if n.is_i64() => Ok(Node::leaf_int(n.as_i64().expect("checked by is_i64"))),
        Value::Array(items) => {
            let children = items.iter().map(build_tree).collect::<Result<Vec<_>, _>>()?;
            Ok(Node::list(children))
        }
        Value::Object(entries) => {
            let mut built = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                built.push((key.clone(), build_tree(value)?));
            }
            Ok(Node::map(built))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Err(BuildError::Unsupported(describe(value))),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean `{b}`"),
        Value::Number(n) => format!("non-integer number `{n}`"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
