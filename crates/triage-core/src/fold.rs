//! Deterministic accent and separator folding for matching free-form labels.
//!
//! Folding uses a fixed table rather than Unicode decomposition so the result
//! never depends on locale data or library versions.

/// Map a lower-case Latin letter carrying a diacritic to its bare form.
pub fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Lower-case, strip diacritics, and collapse every run of `_`, `-` or
/// whitespace into a single `separator`. Leading and trailing separators are
/// dropped.
pub fn fold_key(raw: &str, separator: char) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c == '_' || c == '-' || c.is_whitespace() {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push(separator);
            pending_sep = false;
        }
        out.push(fold_char(c));
    }
    out
}
