//! String normalization for HR movement markers.
//!
//! The upstream `movement_type` field is inconsistently cased and accented
//! ("REMOCAO", "remocao", "Remoção parcial"). Instead of cascading match
//! tiers, every comparison goes through one normalization: trim, casefold,
//! accent-fold. A single substring check against the normalized marker then
//! catches every variant.

/// The normalized transfer marker.
pub const TRANSFER_MARKER: &str = "remocao";

/// Lowercase and strip the accents that occur in Portuguese HR data.
pub fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Whether a movement-type value indicates a transfer.
pub fn is_transfer_marker(movement_type: &str) -> bool {
    normalize(movement_type).contains(TRANSFER_MARKER)
}
