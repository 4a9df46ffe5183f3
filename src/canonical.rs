//! Seam to an external canonicalization engine.
//!
//! This crate does not canonicalize graphs itself. A line-notation writer
//! renders the molecule, and an engine behind [`Canonicalizer`] turns that
//! string into a canonical one.

/// An engine that rewrites line notation into canonical form.
///
/// Returning `None` means the engine could not interpret the input.
pub trait Canonicalizer {
    fn canonicalize(&self, notation: &str) -> Option<String>;
}

impl<F> Canonicalizer for F
where
    F: Fn(&str) -> Option<String>,
{
    fn canonicalize(&self, notation: &str) -> Option<String> {
        self(notation)
    }
}

/// Returns its input unchanged. Useful when no engine is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCanonicalizer;

impl Canonicalizer for IdentityCanonicalizer {
    fn canonicalize(&self, notation: &str) -> Option<String> {
        Some(notation.to_string())
    }
}

/// Canonical form of `notation`, or `notation` itself if the engine fails.
///
/// Failure is soft: callers detect it by comparing the result with the
/// input.
///
/// ```
/// use stereomol::to_canonical;
///
/// let engine = |s: &str| (s == "OC").then(|| "CO\n".to_string());
/// assert_eq!(to_canonical(&engine, "OC"), "CO");
/// assert_eq!(to_canonical(&engine, "C(("), "C((");
/// ```
pub fn to_canonical(engine: &dyn Canonicalizer, notation: &str) -> String {
    match engine.canonicalize(notation) {
        Some(out) if !out.trim().is_empty() => out.trim().to_string(),
        _ => {
            log::warn!("could not canonicalize {notation:?}, returning it unchanged");
            notation.to_string()
        }
    }
}
