use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("expected `<class>=<core>` but got `{0}`")]
    MalformedEntry(String),
    #[error("empty document class or core name in `{0}`")]
    EmptyName(String),
    #[error("document class `{0}` is mapped more than once")]
    DuplicatedClass(String),
}

/// Mapping from document class names to the Solr cores that hold their documents.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentClassMap {
    classes: BTreeMap<String, String>,
}

impl DocumentClassMap {
    /// Parse a comma separated list of `<class>=<core>` pairs.
    ///
    /// ```
    /// use odm_schema_libs::DocumentClassMap;
    ///
    /// let map = DocumentClassMap::parse(r"Acme\Document\User=users, Acme\Document\Post=posts").unwrap();
    /// assert_eq!(map.core(r"Acme\Document\User"), Some("users"));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, MappingError> {
        let mut classes = BTreeMap::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (class, core) = entry
                .split_once('=')
                .ok_or_else(|| MappingError::MalformedEntry(entry.to_string()))?;
            let (class, core) = (class.trim(), core.trim());
            if class.is_empty() || core.is_empty() {
                return Err(MappingError::EmptyName(entry.to_string()));
            }
            if classes
                .insert(class.to_string(), core.to_string())
                .is_some()
            {
                return Err(MappingError::DuplicatedClass(class.to_string()));
            }
        }

        Ok(DocumentClassMap { classes })
    }

    pub fn core(&self, class: &str) -> Option<&str> {
        self.classes.get(class).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.classes
            .iter()
            .map(|(class, core)| (class.as_str(), core.as_str()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
