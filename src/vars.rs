//! Variable substitution for templated config strings.
//!
//! Config fields like `revision_path`, `title` and header values may contain
//! `$NAME` tokens that are replaced with values from a variable context before
//! use. The context is seeded from the run environment plus `ID`, and the
//! extractor adds `INDEX` and `REVISION` per iteration.

use indexmap::IndexMap;

/// Variable context: variable name -> string value.
///
/// Insertion order is preserved, which keeps substitution deterministic when
/// two variable names of equal length could match the same token.
pub type VarMap = IndexMap<String, String>;

/// Replace every `$NAME` token in `template` with the value of `NAME` from
/// `vars`.
///
/// The scan runs once over the original template, left to right. Replacement
/// text is copied to the output verbatim and never rescanned, so a value that
/// itself contains `$OTHER` cannot trigger a second substitution. At each `$`
/// the longest matching variable name wins, so `$INDEX` is never clipped by a
/// shorter name sharing its prefix.
///
/// There is no escape syntax for a literal `$NAME`; a `$` that matches no
/// variable is copied through unchanged.
///
/// # Example
/// ```
/// use relwatch::vars::{apply_vars, VarMap};
///
/// let mut vars = VarMap::new();
/// vars.insert("INDEX".to_string(), "3".to_string());
/// assert_eq!(apply_vars("data[$INDEX].id", &vars), "data[3].id");
/// ```
pub fn apply_vars(template: &str, vars: &VarMap) -> String {
    if vars.is_empty() || !template.contains('$') {
        return template.to_string();
    }

    let mut entries: Vec<(&str, &str)> = vars
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        match entries.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('$');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
