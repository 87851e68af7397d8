/// Trailing segment of a fully qualified type path, for stage names in
/// logs: `"replen_pipeline::components::RankedSelector"` → `"RankedSelector"`.
pub fn short_type_name(full: &str) -> &str {
    match full.rsplit_once("::") {
        Some((_, tail)) => tail,
        None => full,
    }
}

/// Join rationale sections with the stable separator, skipping empties so
/// optional sections never leave dangling delimiters.
pub fn join_sections(sections: &[String]) -> String {
    let parts: Vec<&str> = sections
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(" | ")
}
