use std::path::PathBuf;

/// Root folder all exports land under.
pub const EXPORTS_ROOT: &str = "Gemini_Exports";

/// Fallback basename when a title sanitizes to nothing.
const FALLBACK_TITLE: &str = "gemini_chat";
const MAX_TITLE_LEN: usize = 50;
const MAX_BUCKET_LEN: usize = 16;

/// Replaces non-alphanumerics with `_`, collapses runs, trims the edges,
/// and truncates. Never yields an empty name.
pub fn sanitize_title(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let mut name = compacted.trim_matches('_').to_string();
    if name.len() > MAX_TITLE_LEN {
        name.truncate(MAX_TITLE_LEN);
        name = name.trim_end_matches('_').to_string();
    }
    if name.is_empty() {
        name = FALLBACK_TITLE.to_string();
    }
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

/// Reduces a user-chosen bucket label to a short lowercase alphanumeric
/// token. `None` means the label contributes no sub-folder.
pub fn sanitize_bucket(input: &str) -> Option<String> {
    let token: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_BUCKET_LEN)
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Relative export path: `[<bucket>/]<title>_<conversation id | epoch ms>.md`.
/// The conversation id keeps re-exports of the same chat on one file; the
/// timestamp keeps chats without one from colliding.
pub fn export_relative_path(
    title: &str,
    conversation_id: Option<&str>,
    bucket: Option<&str>,
    now_ms: u64,
) -> PathBuf {
    let base = sanitize_title(title);
    let disambiguator = match conversation_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => now_ms.to_string(),
    };
    let filename = format!("{base}_{disambiguator}.md");
    match bucket.and_then(sanitize_bucket) {
        Some(token) => PathBuf::from(token).join(filename),
        None => PathBuf::from(filename),
    }
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
