//! Template lookup by element name and language preference.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::RegistryError;

/// Where a template's source lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLocation {
    /// Held in memory by a [`MemoryTemplates`] registry.
    Memory,
    /// File on disk.
    Path(PathBuf),
}

/// A template found by [`TemplateRegistry::find_template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    /// Element name.
    pub name: String,
    /// Language variant (`None` for the language-neutral template).
    pub language: Option<String>,
    /// Source location.
    pub location: TemplateLocation,
}

/// Lookup from element name and language to template source.
pub trait TemplateRegistry: Send + Sync {
    /// Find the template for one exact language variant.
    fn lookup(&self, name: &str, language: Option<&str>) -> Option<TemplateRef>;

    /// Read the source of a template previously found by this registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TemplateNotFound`] if the reference does not
    /// belong to this registry, or [`RegistryError::Io`] if it cannot be read.
    fn load_template(&self, template: &TemplateRef) -> Result<String, RegistryError>;

    /// Find the best template for `name` given the caller's language
    /// preferences (most preferred first). The language-neutral template is
    /// tried last.
    fn find_template(&self, name: &str, languages: &[String]) -> Option<TemplateRef> {
        language_candidates(languages)
            .iter()
            .find_map(|lang| self.lookup(name, Some(lang)))
            .or_else(|| self.lookup(name, None))
    }
}

/// Expand language preferences into lookup candidates.
///
/// Each regional tag is followed by its primary subtag (`fr-ch`, `fr`);
/// duplicates keep their first position.
#[must_use]
pub fn language_candidates(languages: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(languages.len() * 2);
    let mut push = |lang: &str| {
        if !lang.is_empty() && !candidates.iter().any(|c| c == lang) {
            candidates.push(lang.to_owned());
        }
    };
    for lang in languages {
        let lang = lang.to_ascii_lowercase();
        push(&lang);
        if let Some((primary, _)) = lang.split_once('-') {
            push(primary);
        }
    }
    candidates
}

/// In-memory templates keyed by name and language.
#[derive(Debug, Default, Clone)]
pub struct MemoryTemplates {
    templates: HashMap<(String, Option<String>), String>,
}

impl MemoryTemplates {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template (builder style).
    #[must_use]
    pub fn with_template(
        mut self,
        name: &str,
        language: Option<&str>,
        source: impl Into<String>,
    ) -> Self {
        self.insert(name, language, source);
        self
    }

    /// Register a template. Names and languages are case-insensitive.
    pub fn insert(&mut self, name: &str, language: Option<&str>, source: impl Into<String>) {
        self.templates.insert(
            (
                name.to_ascii_lowercase(),
                language.map(str::to_ascii_lowercase),
            ),
            source.into(),
        );
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateRegistry for MemoryTemplates {
    fn lookup(&self, name: &str, language: Option<&str>) -> Option<TemplateRef> {
        let key = (name.to_owned(), language.map(str::to_owned));
        self.templates.contains_key(&key).then(|| TemplateRef {
            name: key.0,
            language: key.1,
            location: TemplateLocation::Memory,
        })
    }

    fn load_template(&self, template: &TemplateRef) -> Result<String, RegistryError> {
        if template.location != TemplateLocation::Memory {
            return Err(RegistryError::TemplateNotFound(template.name.clone()));
        }
        self.templates
            .get(&(template.name.clone(), template.language.clone()))
            .cloned()
            .ok_or_else(|| RegistryError::TemplateNotFound(template.name.clone()))
    }
}

/// Several registries consulted in order.
///
/// For each language candidate the registries are asked in order, so a more
/// preferred language in a later registry beats a less preferred one in an
/// earlier registry.
#[derive(Default, Clone)]
pub struct TemplateChain {
    registries: Vec<Arc<dyn TemplateRegistry>>,
}

impl std::fmt::Debug for TemplateChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateChain")
            .field("registries", &self.registries.len())
            .finish()
    }
}

impl TemplateChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registry; earlier registries take precedence.
    #[must_use]
    pub fn with<R: TemplateRegistry + 'static>(mut self, registry: R) -> Self {
        self.registries.push(Arc::new(registry));
        self
    }
}

impl TemplateRegistry for TemplateChain {
    fn lookup(&self, name: &str, language: Option<&str>) -> Option<TemplateRef> {
        self.registries
            .iter()
            .find_map(|registry| registry.lookup(name, language))
    }

    fn load_template(&self, template: &TemplateRef) -> Result<String, RegistryError> {
        for registry in &self.registries {
            match registry.load_template(template) {
                Err(RegistryError::TemplateNotFound(_)) => {}
                result => return result,
            }
        }
        Err(RegistryError::TemplateNotFound(template.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn langs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn test_language_candidates_adds_primary_subtags() {
        assert_eq!(
            language_candidates(&langs(&["fr-CH", "en-US", "fr", "en"])),
            vec!["fr-ch", "fr", "en-us", "en"]
        );
    }

    #[test]
    fn test_find_template_prefers_accepted_language() {
        let templates = MemoryTemplates::new()
            .with_template("infobox", Some("en"), "en")
            .with_template("infobox", None, "neutral");

        let found = templates
            .find_template("infobox", &langs(&["fr", "en"]))
            .unwrap();

        assert_eq!(found.language.as_deref(), Some("en"));
        assert_eq!(templates.load_template(&found).unwrap(), "en");
    }

    #[test]
    fn test_find_template_falls_back_to_neutral() {
        let templates = MemoryTemplates::new()
            .with_template("infobox", Some("de"), "de")
            .with_template("infobox", None, "neutral");

        let found = templates
            .find_template("infobox", &langs(&["fr"]))
            .unwrap();

        assert_eq!(found.language, None);
    }

    #[test]
    fn test_find_template_none() {
        let templates = MemoryTemplates::new().with_template("button", Some("en"), "x");
        assert!(templates.find_template("button", &[]).is_none());
        assert!(templates.find_template("accordion", &langs(&["en"])).is_none());
    }

    #[test]
    fn test_chain_language_beats_registry_order() {
        let first = MemoryTemplates::new().with_template("card", None, "first-neutral");
        let second = MemoryTemplates::new().with_template("card", Some("en"), "second-en");
        let chain = TemplateChain::new().with(first).with(second);

        let found = chain.find_template("card", &langs(&["en"])).unwrap();

        assert_eq!(chain.load_template(&found).unwrap(), "second-en");
    }

    #[test]
    fn test_chain_earlier_registry_wins_same_language() {
        let first = MemoryTemplates::new().with_template("card", None, "first");
        let second = MemoryTemplates::new().with_template("card", None, "second");
        let chain = TemplateChain::new().with(first).with(second);

        let found = chain.find_template("card", &[]).unwrap();

        assert_eq!(chain.load_template(&found).unwrap(), "first");
    }

    #[test]
    fn test_memory_rejects_path_reference() {
        let templates = MemoryTemplates::new().with_template("card", None, "x");
        let foreign = TemplateRef {
            name: "card".to_owned(),
            language: None,
            location: TemplateLocation::Path(PathBuf::from("/tmp/card.jinja")),
        };
        assert!(matches!(
            templates.load_template(&foreign),
            Err(RegistryError::TemplateNotFound(_))
        ));
    }
}
