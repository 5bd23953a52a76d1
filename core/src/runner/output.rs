/// Marker line inserted where output has been elided.
pub const ELISION_MARKER: &str = "… [output elided] …";

/// Bound captured output while preserving both the earliest and the most
/// recent signal: over-limit text keeps the first `limit / 2` and last
/// `limit / 2` lines joined by a single elision marker.
pub fn truncate_output(text: &str, limit: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= limit || limit < 2 {
        return text.to_string();
    }

    let keep = limit / 2;
    let mut out: Vec<&str> = Vec::with_capacity(limit + 1);
    out.extend(&lines[..keep]);
    out.push(ELISION_MARKER);
    out.extend(&lines[lines.len() - keep..]);
    out.join("\n")
}
