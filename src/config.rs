use serde::{Deserialize, Serialize};

/// How a [`Molecule`](crate::Molecule) reacts to structural misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Every invariant violation is returned as a [`MolError`](crate::MolError).
    Strict,
    /// Recoverable violations are repaired through a named
    /// [`Recovery`](crate::Recovery) policy and recorded as diagnostics.
    #[default]
    Permissive,
}

/// Per-molecule construction parameters.
///
/// ```
/// use stereomol::{MolConfig, Strictness};
///
/// let config: MolConfig = serde_json::from_str(r#"{"strictness": "strict"}"#).unwrap();
/// assert_eq!(config.strictness, Strictness::Strict);
/// assert_eq!(MolConfig::default().strictness, Strictness::Permissive);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MolConfig {
    pub strictness: Strictness,
}

impl MolConfig {
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
        }
    }

    pub fn permissive() -> Self {
        Self {
            strictness: Strictness::Permissive,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_permissive() {
        assert!(!MolConfig::default().is_strict());
        assert!(MolConfig::strict().is_strict());
    }

    #[test]
    fn missing_fields_fall_back_to_default() {
        let config: MolConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MolConfig::permissive());
    }

    #[test]
    fn serializes_lowercase() {
        let text = serde_json::to_string(&MolConfig::strict()).unwrap();
        assert_eq!(text, r#"{"strictness":"strict"}"#);
    }
}
