const FALLBACK_NAME: &str = "download";
const MAX_NAME_BYTES: usize = 120;

/// Turns a user-chosen download name into a single safe path component.
///
/// Forbidden characters become `_`, runs of `_` collapse, leading/trailing dots
/// and spaces are dropped, and overly long names are shortened while keeping
/// the extension.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches(&[' ', '.'][..]);
    if trimmed.trim_matches('_').is_empty() {
        return FALLBACK_NAME.to_string();
    }

    let (stem, ext) = split_extension(trimmed);
    let mut stem = shorten(stem, MAX_NAME_BYTES.saturating_sub(ext.len()));
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    format!("{stem}{ext}")
}

/// Splits `name.ext` into (`name`, `.ext`); names without a usable extension keep it empty.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && name.len() - idx <= 8 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn shorten(input: &str, max_bytes: usize) -> String {
    if input.len() <= max_bytes {
        return input.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    input[..end].to_string()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
