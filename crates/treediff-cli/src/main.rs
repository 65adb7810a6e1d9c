//! Reference top-level invocation: diffs two JSON documents and prints the
//! resulting edit script and its cost.
//!
//! With no arguments, diffs the two small maps from the reference example.
//! Given two file paths, diffs the JSON documents found there instead.

use std::fmt;
use std::fs;
use std::process::ExitCode;

use log::info;
use serde_json::{json, Value};
use treediff_build::build_tree;
use treediff_core::NodeRef;
use treediff_engine::{diff, AtomicKind};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (from_value, to_value) = match args.as_slice() {
        [] => (json!({"test": "foo", "baz": 1}), json!({"test": "bar", "baz": 2})),
        [from_path, to_path] => match (read_json(from_path), read_json(to_path)) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("treediff: {e}");
                return ExitCode::FAILURE;
            }
        },
        _ => {
            eprintln!("usage: treediff [<from.json> <to.json>]");
            return ExitCode::FAILURE;
        }
    };

    let (from_tree, to_tree) = match (build_tree(&from_value), build_tree(&to_value)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("treediff: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("diffing two trees of size {} and {}", from_tree.total_size(), to_tree.total_size());
    let result = diff(from_tree, to_tree);

    println!("cost: {}", result.cost());
    for edit in &result.edits {
        println!("{}", render_edit(edit, &result.from_root, &result.to_root));
    }

    ExitCode::SUCCESS
}

fn read_json(path: &str) -> Result<Value, ReadError> {
    let contents = fs::read_to_string(path).map_err(|source| ReadError::Io(path.to_string(), source))?;
    serde_json::from_str(&contents).map_err(|source| ReadError::Parse(path.to_string(), source))
}

#[derive(Debug)]
enum ReadError {
    Io(String, std::io::Error),
    Parse(String, serde_json::Error),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Io(path, source) => write!(f, "could not read {path}: {source}"),
            ReadError::Parse(path, source) => write!(f, "could not parse {path} as JSON: {source}"),
        }
    }
}

fn render_edit(edit: &treediff_engine::AtomicEdit, _from_root: &NodeRef, _to_root: &NodeRef) -> String {
    match edit.kind {
        AtomicKind::Match => format!("Match {} -> {} (cost {})", edit.from, edit.to.as_ref().unwrap(), edit.cost()),
        AtomicKind::Replace => {
            format!("Replace {} -> {} (cost {})", edit.from, edit.to.as_ref().unwrap(), edit.cost())
        }
        AtomicKind::Remove => format!("Remove {} from {} (cost {})", edit.from, edit.to.as_ref().unwrap(), edit.cost()),
        AtomicKind::Insert => format!("Insert {} into {} (cost {})", edit.from, edit.to.as_ref().unwrap(), edit.cost()),
    }
}
