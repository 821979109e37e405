/// Splits the text form of a one-dimensional array such as `{a,b,c}`.
///
/// Only the surrounding braces are removed; elements are not unquoted, so
/// values containing commas or quotes are not supported.
pub fn parse_string_array(raw: &str) -> Vec<String> {
    let inner = raw.trim_matches(|ch| ch == '{' || ch == '}');
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(str::to_string).collect()
}
