pub const HYDROGEN: &str = "H";

/// Symbols that may be written without brackets.
pub const ORGANIC_SUBSET: [&str; 10] = ["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];

pub fn is_organic_subset(symbol: &str) -> bool {
    ORGANIC_SUBSET.contains(&symbol)
}

/// Maximum valence used for implicit-hydrogen inference.
///
/// Only the common organic families are inferred; every other element
/// (including `"H"` itself) returns `None` and is left alone. Symbols are
/// case-sensitive.
pub fn max_valence(symbol: &str) -> Option<u8> {
    match symbol {
        "C" => Some(4),
        "N" | "P" => Some(3),
        "O" | "S" => Some(2),
        "F" | "Br" | "Cl" | "I" => Some(1),
        _ => None,
    }
}
