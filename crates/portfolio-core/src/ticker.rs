/// Canonical ticker form used on both sides of a price lookup:
/// uppercase, with one trailing exchange suffix stripped. Index symbols
/// like `^NSEI` pass through untouched. Empty input comes back empty.
pub fn normalize_ticker(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let upper = raw.to_uppercase();
    for suffix in [".NSE", ".BSE", ".NS"] {
        if let Some(stripped) = upper.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    upper
}
