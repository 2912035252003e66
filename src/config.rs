//! Generation options and the target-language selector.
//!
//! `GenerationConfig` deserializes from snake_case JSON so the CLI can take
//! a `--config` file; every field has a default and the flags compose
//! independently. Options that only apply to some languages (tag sets,
//! pointer optionals) are ignored by the other emitters rather than
//! rejected.

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ------------------------------ Language ---------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Java,
    #[value(alias = "ts")]
    Typescript,
    #[value(alias = "py")]
    Python,
}

impl Language {
    pub const ALL: [Language; 4] =
        [Language::Go, Language::Java, Language::Typescript, Language::Python];

    pub fn name(self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Java => "java",
            Language::Typescript => "typescript",
            Language::Python => "python",
        }
    }

    /// Conventional source-file extension, for `--out` directories.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Java => "java",
            Language::Typescript => "ts",
            Language::Python => "py",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unsupported language `{requested}` (expected one of: golang, java, typescript, python)")]
pub struct UnsupportedLanguage {
    pub requested: String,
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    /// Accepts the selectors the original service used (`golang`, `java`,
    /// `typescript`, `python`) plus common short forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "typescript" | "ts" => Ok(Language::Typescript),
            "python" | "py" => Ok(Language::Python),
            _ => Err(UnsupportedLanguage { requested: s.to_string() }),
        }
    }
}

// ------------------------------- Options ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingCase {
    Pascal,
    Camel,
    Snake,
}

impl NamingCase {
    /// Field-identifier convention of each target language.
    pub fn default_for(language: Language) -> Self {
        match language {
            Language::Go => NamingCase::Pascal,
            Language::Java | Language::Typescript => NamingCase::Camel,
            Language::Python => NamingCase::Snake,
        }
    }
}

/// Struct tag / annotation families. Only Go renders tags; the rest ignore
/// them. The set mirrors what the original service offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSet {
    Json,
    Mapstructure,
    Gorm,
    Bson,
    Yaml,
    Xml,
    Validate,
    Form,
}

impl TagSet {
    pub fn key(self) -> &'static str {
        match self {
            TagSet::Json => "json",
            TagSet::Mapstructure => "mapstructure",
            TagSet::Gorm => "gorm",
            TagSet::Bson => "bson",
            TagSet::Yaml => "yaml",
            TagSet::Xml => "xml",
            TagSet::Validate => "validate",
            TagSet::Form => "form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Exported / public members.
    Public,
    /// The language's unadorned default.
    Default,
}

/// How an optional field is spelled. Each emitter honors the variants that
/// exist in its language and falls back to its documented default for the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalRepr {
    /// `*T` (Go).
    Pointer,
    /// `Optional[T]` / boxed wrapper (Java, Python).
    WrapperType,
    /// `T | null` (TypeScript).
    NullableUnion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRepr {
    /// Leave timestamp-looking strings as plain strings.
    String,
    /// `time.Time`, `OffsetDateTime`, `Date`, `datetime`.
    NativeTemporal,
}

// ------------------------------- Config ------------------------------------ //

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct GenerationConfig {
    /// Field-identifier casing; `None` means the target language's own
    /// convention.
    pub naming_case: Option<NamingCase>,
    pub tag_sets: Vec<TagSet>,
    pub visibility: Visibility,
    /// `None` means the target language's idiomatic optional spelling.
    pub optional_repr: Option<OptionalRepr>,
    pub time_repr: TimeRepr,
    pub include_comments: bool,
    /// Go package header; ignored elsewhere.
    pub package_name: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            naming_case: None,
            tag_sets: vec![TagSet::Json],
            visibility: Visibility::Public,
            optional_repr: None,
            time_repr: TimeRepr::NativeTemporal,
            include_comments: true,
            package_name: "main".to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn naming_case_for(&self, language: Language) -> NamingCase {
        self.naming_case
            .unwrap_or_else(|| NamingCase::default_for(language))
    }
}

// ------------------------------- Tests ------------------------------------ //
