//! Class vocabulary and label-name normalization

use crate::{DatasetError, Result};
use std::collections::{BTreeSet, HashMap};

/// Normalize a raw annotation label: trimmed and lower-cased
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Ordered class list plus the table that maps raw label names onto it.
///
/// The position of a class in the list is its channel index in every
/// presence tensor and grid label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassVocabulary {
    classes: Vec<String>,
    name_converter: HashMap<String, String>,
}

impl ClassVocabulary {
    /// Build a vocabulary from an ordered class list and a name table.
    ///
    /// Table keys are normalized so that lookups of normalized raw names match.
    pub fn new<I, K, V>(classes: Vec<String>, names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let name_converter = names
            .into_iter()
            .map(|(raw, canonical)| (normalize_name(raw.as_ref()), canonical.into()))
            .collect();
        Self {
            classes,
            name_converter,
        }
    }

    /// Vocabulary whose name table maps each class onto itself
    pub fn identity(classes: Vec<String>) -> Self {
        let names: Vec<(String, String)> = classes
            .iter()
            .map(|class| (class.clone(), class.clone()))
            .collect();
        Self::new(classes, names)
    }

    /// Number of classes (channels)
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Canonical class name for a raw label, if the table knows it
    #[must_use]
    pub fn canonical_name(&self, raw: &str) -> Option<&str> {
        self.name_converter
            .get(&normalize_name(raw))
            .map(String::as_str)
    }

    /// Channel index for a raw annotation label.
    ///
    /// # Errors
    /// `UnmappedName` if the normalized label is not in the name table,
    /// `UnknownClass` if its canonical name is not in the class list.
    pub fn class_index(&self, raw: &str) -> Result<usize> {
        let canonical = self
            .canonical_name(raw)
            .ok_or_else(|| DatasetError::UnmappedName(normalize_name(raw)))?;
        self.classes
            .iter()
            .position(|class| class == canonical)
            .ok_or_else(|| DatasetError::UnknownClass(canonical.to_string()))
    }

    /// Check the vocabulary as a whole before any record is processed.
    ///
    /// # Errors
    /// `InvalidConfig` for an empty class list, duplicate classes, or name
    /// table entries that point outside the class list.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(DatasetError::InvalidConfig(
                "class vocabulary is empty".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for class in &self.classes {
            if !seen.insert(class.as_str()) {
                return Err(DatasetError::InvalidConfig(format!(
                    "duplicate class in vocabulary: {class:?}"
                )));
            }
        }

        let dangling: BTreeSet<&str> = self
            .name_converter
            .values()
            .map(String::as_str)
            .filter(|canonical| !seen.contains(canonical))
            .collect();
        if !dangling.is_empty() {
            return Err(DatasetError::InvalidConfig(format!(
                "name table targets missing from vocabulary: {dangling:?}"
            )));
        }

        Ok(())
    }
}
