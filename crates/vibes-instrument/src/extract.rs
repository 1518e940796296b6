use glob::{MatchOptions, Pattern};

/// Prioritized field names tried, in order, to find a tool event's file
/// path (spec §4.5.2). The first string-valued match wins.
const FILE_PATH_FIELDS: &[&str] = &["file_path", "path", "notebook_path", "filename", "target_file"];

pub fn extract_file_path(input: &serde_json::Value) -> Option<String> {
    FILE_PATH_FIELDS
        .iter()
        .find_map(|field| input.get(field).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

pub fn extract_shell_command(input: &serde_json::Value) -> Option<String> {
    input
        .get("command")
        .or_else(|| input.get("cmd"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// `offset`+`limit` → `[offset, offset+limit-1]`, or `cell_number` →
/// `[n, n]`. `None` if neither shape is present.
pub fn extract_line_range(input: &serde_json::Value) -> Option<(u32, u32)> {
    let offset = input.get("offset").and_then(|v| v.as_u64());
    let limit = input.get("limit").and_then(|v| v.as_u64());
    if let (Some(offset), Some(limit)) = (offset, limit) {
        if limit == 0 {
            return Some((offset as u32, offset as u32));
        }
        return Some((offset as u32, (offset + limit - 1) as u32));
    }
    if let Some(cell) = input.get("cell_number").and_then(|v| v.as_u64()) {
        return Some((cell as u32, cell as u32));
    }
    None
}

/// Separator canonicalization plus `.`/`..` resolution (spec §4.5.3),
/// purely lexical — no filesystem access.
pub fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    let is_absolute = slashed.starts_with('/');
    let mut stack: Vec<&str> = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => match stack.last() {
                Some(&last) if last != ".." => {
                    stack.pop();
                }
                _ if !is_absolute => stack.push(".."),
                _ => {}
            },
            other => stack.push(other),
        }
    }
    let joined = stack.join("/");
    if is_absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Minimal glob matcher supporting `*`, `**`, `?` (spec §4.5.3). Grounded
/// on `cli-sub-agent::audit::helpers::expand_file_args`'s confirmed use
/// of `glob::Pattern` with `require_literal_separator: true` — that
/// option is what keeps `*` from crossing a `/` while leaving `**` free
/// to cross directories, exactly the semantics the spec calls for.
pub fn is_excluded(normalized_path: &str, exclude_patterns: &[String]) -> bool {
    let options = MatchOptions {
        require_literal_separator: true,
        ..Default::default()
    };
    exclude_patterns.iter().any(|pattern| {
        Pattern::new(pattern)
            .map(|p| p.matches_with(normalized_path, options))
            .unwrap_or(false)
    })
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}
