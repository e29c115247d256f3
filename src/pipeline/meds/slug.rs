//! Deterministic medication identifiers.
//!
//! `canonical_slug` turns a display name into a stable lowercase
//! hyphenated identifier; accent-carrying Latin letters are folded to
//! their ASCII base so spelling variants of the same generic collapse to
//! one identifier. Names that leave nothing usable behind (entirely
//! non-Latin, empty) get a short stable hash instead, so every entry
//! still receives a non-empty identifier.

use sha2::{Digest, Sha256};

/// Slug of a canonical name: lowercase, accents folded, runs of anything
/// non-alphanumeric collapsed to single hyphens, edges trimmed. `None`
/// when nothing alphanumeric survives.
pub fn canonical_slug(name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if let Some(folded) = fold_latin(c) {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push_str(folded);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Short stable identifier for names the slug cannot handle.
pub fn short_hash(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("med-{hex}")
}

/// ASCII fold for the Latin letters that show up in drug names. Input is
/// already lowercased.
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'ç' | 'ć' | 'č' => "c",
        'ñ' | 'ń' => "n",
        'ś' | 'š' => "s",
        'ź' | 'ž' | 'ż' => "z",
        'ł' => "l",
        'đ' => "d",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}
