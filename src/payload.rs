//! Path-based addressing into parsed JSON payloads.
//!
//! Paths use dotted map-key access and bracketed sequence indices, e.g.
//! `data[0].id` or `releases[-1].name`. Negative indices address from the end
//! of a sequence. Resolution distinguishes "not found" (`None`) from a found
//! JSON `null` (`Some(Value::Null)`).

use std::fmt;

use serde_json::Value;

/// A segment in a payload path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A map key (e.g. `data`, `name`)
    Key(String),
    /// A sequence index; negative counts from the end (`-1` is the last element)
    Index(i64),
}

/// Error type for path parsing.
///
/// Only raised for malformed path syntax. A path that is well-formed but does
/// not exist in the payload is reported by [`resolve`] returning `None`, not
/// by an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid path '{}': {}", self.path, self.reason)
    }
}

impl std::error::Error for PathError {}

fn syntax_error(path: &str, reason: &str) -> PathError {
    PathError {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a path string into segments.
///
/// Grammar: dot-separated parts, each an optional key followed by zero or
/// more `[index]` accessors. `data[0].id` parses to
/// `[Key("data"), Index(0), Key("id")]`; a leading `[0]` addresses a
/// sequence at the payload root.
///
/// # Errors
/// Returns [`PathError`] for empty segments, unclosed brackets, non-integer
/// indices or stray text after an index.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, PathError> {
    if path.is_empty() {
        return Err(syntax_error(path, "path is empty"));
    }

    let mut segments = Vec::new();

    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(bracket) => (&part[..bracket], &part[bracket..]),
            None => (part, ""),
        };

        if key.is_empty() && rest.is_empty() {
            return Err(syntax_error(path, "empty segment"));
        }

        if !key.is_empty() {
            segments.push(PathSegment::Key(key.to_string()));
        }

        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return Err(syntax_error(path, "expected '[' after index accessor"));
            }
            let close = rest
                .find(']')
                .ok_or_else(|| syntax_error(path, "unclosed '['"))?;
            let index: i64 = rest[1..close]
                .parse()
                .map_err(|_| syntax_error(path, "index is not an integer"))?;
            segments.push(PathSegment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    Ok(segments)
}

/// Resolve parsed path segments against a payload tree.
///
/// # Returns
/// * `Some(value)` - the path exists; the value may be JSON `null`
/// * `None` - a key or index is missing at some level, an index is out of
///   range, or a segment kind does not match the node (keying into a
///   sequence, indexing into a map or scalar)
pub fn resolve<'a>(payload: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let mut current = payload;

    for segment in segments {
        current = match segment {
            PathSegment::Key(key) => current.as_object()?.get(key)?,
            PathSegment::Index(index) => {
                let seq = current.as_array()?;
                let offset = if *index < 0 {
                    seq.len().checked_sub(index.unsigned_abs() as usize)?
                } else {
                    *index as usize
                };
                seq.get(offset)?
            }
        };
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_key() {
        let segments = parse_path("version").unwrap();
        assert_eq!(segments, vec![PathSegment::Key("version".to_string())]);
    }

    #[test]
    fn test_parse_dotted_keys() {
        let segments = parse_path("release.name").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Key("release".to_string()),
                PathSegment::Key("name".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_key_with_index() {
        let segments = parse_path("data[0].id").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Key("data".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("id".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_negative_index() {
        let segments = parse_path("data[-1]").unwrap();
        assert_eq!(
            segments,
            vec![PathSegment::Key("data".to_string()), PathSegment::Index(-1)]
        );
    }

    #[test]
    fn test_parse_chained_indices() {
        let segments = parse_path("grid[1][2]").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Key("grid".to_string()),
                PathSegment::Index(1),
                PathSegment::Index(2),
            ]
        );
    }

    #[test]
    fn test_parse_root_index() {
        let segments = parse_path("[0].id").unwrap();
        assert_eq!(
            segments,
            vec![PathSegment::Index(0), PathSegment::Key("id".to_string())]
        );
    }

    #[test]
    fn test_parse_syntax_errors() {
        assert!(parse_path("").is_err());
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("data[0").is_err());
        assert!(parse_path("data[x]").is_err());
        assert!(parse_path("data[0]junk").is_err());
    }

    #[test]
    fn test_resolve_nested() {
        let payload = json!({"release": {"name": "v1.0"}});
        let segments = parse_path("release.name").unwrap();
        assert_eq!(resolve(&payload, &segments), Some(&json!("v1.0")));
    }

    #[test]
    fn test_resolve_index() {
        let payload = json!({"data": [{"id": 10}, {"id": 20}]});
        let segments = parse_path("data[1].id").unwrap();
        assert_eq!(resolve(&payload, &segments), Some(&json!(20)));
    }

    #[test]
    fn test_resolve_negative_index() {
        let payload = json!({"data": ["a", "b", "c"]});
        assert_eq!(
            resolve(&payload, &parse_path("data[-1]").unwrap()),
            Some(&json!("c"))
        );
        assert_eq!(
            resolve(&payload, &parse_path("data[-3]").unwrap()),
            Some(&json!("a"))
        );
        assert_eq!(resolve(&payload, &parse_path("data[-4]").unwrap()), None);
    }

    #[test]
    fn test_resolve_missing_key() {
        let payload = json!({"release": {"name": "v1.0"}});
        assert_eq!(resolve(&payload, &parse_path("release.tag").unwrap()), None);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let payload = json!({"data": ["a"]});
        assert_eq!(resolve(&payload, &parse_path("data[1]").unwrap()), None);
    }

    #[test]
    fn test_resolve_kind_mismatch() {
        let payload = json!({"data": ["a"], "name": "x"});
        // keying into a sequence
        assert_eq!(resolve(&payload, &parse_path("data.id").unwrap()), None);
        // indexing into a scalar
        assert_eq!(resolve(&payload, &parse_path("name[0]").unwrap()), None);
    }

    #[test]
    fn test_resolve_found_null_is_not_missing() {
        let payload = json!({"description": null});
        let segments = parse_path("description").unwrap();
        assert_eq!(resolve(&payload, &segments), Some(&Value::Null));
    }

    #[test]
    fn test_resolve_empty_segments_is_root() {
        let payload = json!({"a": 1});
        assert_eq!(resolve(&payload, &[]), Some(&payload));
    }
}
