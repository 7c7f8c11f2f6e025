use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Target language utilities
///
/// This module holds the table of languages COBOL can be migrated to, and
/// the case-insensitive lookup that maps user input (a canonical name or an
/// alias such as `C#`) to the canonical entry and its file extension.

/// Extension used when a language has no mapped extension
pub const FALLBACK_EXTENSION: &str = ".txt";

/// One migration target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetLanguage {
    /// Canonical display name, e.g. `Java`
    pub name: String,

    /// Output file extension with a leading dot, e.g. `.java`
    #[serde(default)]
    pub extension: String,

    /// Alternative spellings accepted on input
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl TargetLanguage {
    pub fn new(name: &str, extension: &str) -> Self {
        Self {
            name: name.to_string(),
            extension: extension.to_string(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Whether `input` names this language, ignoring case and surrounding whitespace
    pub fn matches(&self, input: &str) -> bool {
        let needle = input.trim();
        self.name.eq_ignore_ascii_case(needle) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(needle))
    }

    /// The output extension, or `.txt` when none is mapped
    pub fn output_extension(&self) -> &str {
        if self.extension.is_empty() {
            FALLBACK_EXTENSION
        } else {
            &self.extension
        }
    }
}

/// The languages available out of the box
pub fn default_languages() -> Vec<TargetLanguage> {
    vec![
        TargetLanguage::new("Java", ".java"),
        TargetLanguage::new("CSharp", ".cs").with_alias("C#"),
        TargetLanguage::new("Python", ".py"),
        TargetLanguage::new("JavaScript", ".js"),
        TargetLanguage::new("C++", ".cpp"),
        TargetLanguage::new("Ruby", ".rb"),
        TargetLanguage::new("PHP", ".php"),
        TargetLanguage::new("Go", ".go"),
        TargetLanguage::new("Swift", ".swift"),
        TargetLanguage::new("Kotlin", ".kt"),
    ]
}

/// Find the entry `input` refers to
pub fn find_language<'a>(languages: &'a [TargetLanguage], input: &str) -> Option<&'a TargetLanguage> {
    languages.iter().find(|lang| lang.matches(input))
}

/// Resolve `input` to its table entry, failing with the list of valid names
pub fn resolve_language<'a>(languages: &'a [TargetLanguage], input: &str) -> Result<&'a TargetLanguage> {
    find_language(languages, input).ok_or_else(|| {
        anyhow!(
            "Unsupported target language '{}'. Valid options: {}",
            input.trim(),
            language_names(languages).join(", ")
        )
    })
}

/// Canonical names in table order
pub fn language_names(languages: &[TargetLanguage]) -> Vec<&str> {
    languages.iter().map(|lang| lang.name.as_str()).collect()
}

/// Check a language table for structural problems
pub fn validate_language_table(languages: &[TargetLanguage]) -> Result<()> {
    if languages.is_empty() {
        return Err(anyhow!("The target language table is empty"));
    }

    for (i, lang) in languages.iter().enumerate() {
        if lang.name.trim().is_empty() {
            return Err(anyhow!("Target language #{} has an empty name", i + 1));
        }
        if !lang.extension.is_empty() && !lang.extension.starts_with('.') {
            return Err(anyhow!(
                "Extension '{}' for {} must start with '.'",
                lang.extension,
                lang.name
            ));
        }
        if languages[..i].iter().any(|other| other.name.eq_ignore_ascii_case(&lang.name)) {
            return Err(anyhow!("Target language '{}' is listed more than once", lang.name));
        }
    }

    Ok(())
}
