//! Body-kind resolution and field-level candidate handling for JSON and
//! form-encoded request bodies.

use serde_json::Value;

use crate::config::BodyTypeConfig;
use crate::model::BodyKind;

/// Number of minimizable fields in a body of the given kind, for report
/// counts. `None`/empty bodies count as zero; a raw body is a single
/// opaque field since it has no sub-structure to enumerate.
pub fn count_body_fields(kind: BodyKind, body_text: Option<&str>) -> usize {
    let Some(text) = body_text else {
        return 0;
    };
    match kind {
        BodyKind::Json => serde_json::from_str::<Value>(text)
            .map(|value| enumerate_json_candidates(&value).len())
            .unwrap_or(1),
        BodyKind::Form => parse_form_body(text).len(),
        BodyKind::Raw => 1,
    }
}

/// One JSON path segment: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A single removable leaf in a JSON body, identified by its full path
/// from the root.
#[derive(Debug, Clone)]
pub struct JsonCandidate {
    pub path: Vec<PathSegment>,
}

/// Works out which of the three body shapes a request's body actually is.
pub fn resolve_body_kind(mime_type: Option<&str>, body_text: &str, configured: BodyTypeConfig) -> BodyKind {
    match configured {
        BodyTypeConfig::Json => BodyKind::Json,
        BodyTypeConfig::Form => BodyKind::Form,
        BodyTypeConfig::Raw => BodyKind::Raw,
        BodyTypeConfig::Auto => {
            if let Some(mime) = mime_type {
                if mime.contains("application/json") {
                    return BodyKind::Json;
                }
                if mime.contains("application/x-www-form-urlencoded") {
                    return BodyKind::Form;
                }
            }
            if serde_json::from_str::<Value>(body_text).is_ok() {
                BodyKind::Json
            } else {
                BodyKind::Raw
            }
        }
    }
}

/// Walks a parsed JSON value and returns every leaf-path candidate, in a
/// stable depth-first order matching serialization order.
pub fn enumerate_json_candidates(value: &Value) -> Vec<JsonCandidate> {
    let mut candidates = Vec::new();
    walk(value, &mut Vec::new(), &mut candidates);
    candidates
}

fn walk(value: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<JsonCandidate>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(PathSegment::Key(key.clone()));
                out.push(JsonCandidate { path: path.clone() });
                walk(child, path, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                out.push(JsonCandidate { path: path.clone() });
                walk(child, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

/// True when the value at `path` is empty (empty string/array/object).
pub fn is_empty_value(root: &Value, path: &[PathSegment]) -> bool {
    match get(root, path) {
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(m)) => m.is_empty(),
        _ => false,
    }
}

fn get<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = match (segment, current) {
            (PathSegment::Key(k), Value::Object(map)) => map.get(k)?,
            (PathSegment::Index(i), Value::Array(items)) => items.get(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Top-level key (or index, stringified) a path hangs off of, used for
/// `protected_keys`/`only_keys` matching.
pub fn top_level_key(path: &[PathSegment]) -> Option<String> {
    match path.first()? {
        PathSegment::Key(k) => Some(k.clone()),
        PathSegment::Index(i) => Some(i.to_string()),
    }
}

/// Removes the value at `path` from a clone of `root`: deletes the key
/// from its containing object, or the element from its containing array
/// (shifting later elements down).
pub fn remove_path(root: &Value, path: &[PathSegment]) -> Value {
    let mut clone = root.clone();
    if path.is_empty() {
        return clone;
    }
    remove_in(&mut clone, path);
    clone
}

fn remove_in(value: &mut Value, path: &[PathSegment]) {
    if path.len() == 1 {
        match (&path[0], value) {
            (PathSegment::Key(k), Value::Object(map)) => {
                map.remove(k);
            }
            (PathSegment::Index(i), Value::Array(items)) => {
                if *i < items.len() {
                    items.remove(*i);
                }
            }
            _ => {}
        }
        return;
    }

    let (head, rest) = (&path[0], &path[1..]);
    match (head, value) {
        (PathSegment::Key(k), Value::Object(map)) => {
            if let Some(child) = map.get_mut(k) {
                remove_in(child, rest);
            }
        }
        (PathSegment::Index(i), Value::Array(items)) => {
            if let Some(child) = items.get_mut(*i) {
                remove_in(child, rest);
            }
        }
        _ => {}
    }
}

/// One occurrence of a form field, keyed by its position so duplicate
/// names are independently removable, mirroring header candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Parses an `application/x-www-form-urlencoded` body into ordered pairs.
pub fn parse_form_body(body: &str) -> Vec<FormField> {
    form_urlencoded::parse(body.as_bytes())
        .map(|(name, value)| FormField {
            name: name.into_owned(),
            value: value.into_owned(),
        })
        .collect()
}

/// Re-encodes ordered form pairs back into `application/x-www-form-urlencoded`.
pub fn serialize_form_body(fields: &[FormField]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for field in fields {
        serializer.append_pair(&field.name, &field.value);
    }
    serializer.finish()
}
