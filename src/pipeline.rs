//! Generation pipeline: parse → infer → resolve → emit.
//!
//! Every stage is a pure function; a failure stops the pipeline and reports
//! the stage (plus the sample index for per-sample failures). Nothing is
//! retried and nothing outlives the call, so concurrent generations never
//! interact — resubmitting corrected input is the caller's job.

use rayon::prelude::*;
use thiserror::Error;

use crate::config::{GenerationConfig, Language, UnsupportedLanguage};
use crate::emit::emit;
use crate::infer::{Inference, Inferred};
use crate::parse::{parse, ParseError};
use crate::resolve::{resolve, ResolveError};

// ------------------------------- Request ----------------------------------- //

/// One generation call. `language` is the transport-level selector string
/// (`golang`, `java`, `typescript`, `python`), kept raw so an unknown value
/// fails with `UnsupportedLanguage` rather than at argument-parsing time.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub samples: Vec<String>,
    pub language: String,
    pub root_name: String,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub source_text: String,
    /// Soft diagnostics from every stage, in pipeline order.
    pub warnings: Vec<String>,
}

// ------------------------------- Errors ------------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Infer,
    Resolve,
    Emit,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Parse => "parse",
            Stage::Infer => "infer",
            Stage::Resolve => "resolve",
            Stage::Emit => "emit",
        })
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no samples supplied")]
    EmptySamples,
    #[error("sample {index}: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    UnsupportedLanguage(#[from] UnsupportedLanguage),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl GenerateError {
    /// Pipeline stage at which the failure happened.
    pub fn stage(&self) -> Stage {
        match self {
            GenerateError::EmptySamples | GenerateError::Parse { .. } => Stage::Parse,
            GenerateError::UnsupportedLanguage(_) => Stage::Emit,
            GenerateError::Resolve(_) => Stage::Resolve,
        }
    }

    /// Index of the offending sample, for multi-sample failures.
    pub fn sample_index(&self) -> Option<usize> {
        match self {
            GenerateError::Parse { index, .. } => Some(*index),
            _ => None,
        }
    }
}

// ------------------------------- Pipeline ----------------------------------- //

fn parse_and_infer(samples: &[String]) -> Result<(Inferred, Vec<String>), GenerateError> {
    if samples.is_empty() {
        return Err(GenerateError::EmptySamples);
    }
    let mut warnings = Vec::new();
    let mut inference = Inference::new();
    for (index, text) in samples.iter().enumerate() {
        let parsed = parse(text).map_err(|source| GenerateError::Parse { index, source })?;
        warnings.extend(parsed.warnings.into_iter().map(|w| format!("sample {index}: {w}")));
        inference.observe(&parsed.root);
    }
    let inferred = inference.finish();
    Ok((inferred, warnings))
}

fn resolve_and_emit(
    inferred: &Inferred,
    root_name: &str,
    language: Language,
    config: &GenerationConfig,
    mut warnings: Vec<String>,
) -> Result<Generated, GenerateError> {
    let resolved = resolve(&inferred.root, root_name, language, config)?;
    warnings.extend(inferred.warnings.iter().cloned());
    warnings.extend(resolved.warnings);
    let source_text = emit(
        &resolved.root,
        root_name,
        &resolved.registry,
        config,
        language,
    );
    Ok(Generated { source_text, warnings })
}

/// Run the whole pipeline for one request.
pub fn generate(request: &GenerateRequest) -> Result<Generated, GenerateError> {
    let language: Language = request.language.parse()?;
    let (inferred, warnings) = parse_and_infer(&request.samples)?;
    resolve_and_emit(&inferred, &request.root_name, language, &request.config, warnings)
}

/// Parse and infer once, then resolve + emit every supported language over
/// the shared result. Emission never mutates the type graph, so the
/// per-language work runs in parallel.
pub fn generate_all(
    samples: &[String],
    root_name: &str,
    config: &GenerationConfig,
) -> Result<Vec<(Language, Result<Generated, GenerateError>)>, GenerateError> {
    let (inferred, warnings) = parse_and_infer(samples)?;
    Ok(Language::ALL
        .into_par_iter()
        .map(|language| {
            let out = resolve_and_emit(&inferred, root_name, language, config, warnings.clone());
            (language, out)
        })
        .collect())
}

// ------------------------------- Tests ------------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;

    fn request(samples: &[&str], language: &str, root_name: &str) -> GenerateRequest {
        GenerateRequest {
            samples: samples.iter().map(|s| s.to_string()).collect(),
            language: language.to_string(),
            root_name: root_name.to_string(),
            config: GenerationConfig::default(),
        }
    }

    #[test]
    fn user_scenario_end_to_end() {
        let out = generate(&request(
            &[r#"{"id": 1, "name": "John", "active": true}"#],
            "golang",
            "User",
        ))
        .unwrap();
        assert!(out.source_text.contains("type User struct {"));
        let id = out.source_text.find("ID int64").unwrap();
        let name = out.source_text.find("Name string").unwrap();
        let active = out.source_text.find("Active bool").unwrap();
        assert!(id < name && name < active);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn unsupported_language_fails_with_no_partial_output() {
        let err = generate(&request(&[r#"{"a": 1}"#], "cobol", "Root")).unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedLanguage(_)));
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn malformed_sample_reports_stage_and_index() {
        let err = generate(&request(
            &[r#"{"ok": 1}"#, r#"{"broken": }"#],
            "golang",
            "Root",
        ))
        .unwrap_err();
        assert_eq!(err.stage(), Stage::Parse);
        assert_eq!(err.sample_index(), Some(1));
        assert!(err.to_string().contains("byte"));
    }

    #[test]
    fn empty_sample_list_is_rejected() {
        let err = generate(&request(&[], "golang", "Root")).unwrap_err();
        assert!(matches!(err, GenerateError::EmptySamples));
        assert_eq!(err.stage(), Stage::Parse);
    }

    #[test]
    fn duplicate_key_and_conflict_warnings_surface_together() {
        let out = generate(&request(
            &[r#"{"a": 1, "a": 2}"#, r#"{"a": "s"}"#],
            "golang",
            "Root",
        ))
        .unwrap();
        assert_eq!(out.warnings.len(), 2, "{:?}", out.warnings);
        assert!(out.warnings[0].starts_with("sample 0: duplicate object key"));
        assert!(out.warnings[1].contains("irreconcilable types at $.a"));
        // degraded, not failed
        assert!(out.source_text.contains("A interface{}"));
    }

    #[test]
    fn identical_requests_yield_identical_output() {
        let req = request(&[r#"{"x": [1, 2.5], "y": {"k": null}}"#], "typescript", "Root");
        let a = generate(&req).unwrap();
        let b = generate(&req).unwrap();
        assert_eq!(a.source_text, b.source_text);
        assert_eq!(a.warnings, b.warnings);
    }

    #[test]
    fn sample_order_controls_declared_field_order() {
        let ab = generate(&request(&[r#"{"a": 1}"#, r#"{"b": 1}"#], "golang", "R")).unwrap();
        let ba = generate(&request(&[r#"{"b": 1}"#, r#"{"a": 1}"#], "golang", "R")).unwrap();
        assert!(ab.source_text.find("A *int64").unwrap() < ab.source_text.find("B *int64").unwrap());
        assert!(ba.source_text.find("B *int64").unwrap() < ba.source_text.find("A *int64").unwrap());
    }

    #[test]
    fn generate_all_covers_every_language() {
        let outs = generate_all(
            &[r#"{"id": 1, "tags": ["x"]}"#.to_string()],
            "Root",
            &GenerationConfig::default(),
        )
        .unwrap();
        assert_eq!(outs.len(), Language::ALL.len());
        for (language, result) in outs {
            let generated = result.unwrap_or_else(|e| panic!("{language} failed: {e}"));
            assert!(!generated.source_text.is_empty());
        }
    }

    #[test]
    fn numeric_widening_reaches_the_output() {
        let out = generate(&request(&[r#"{"x": 1}"#, r#"{"x": 1.5}"#], "golang", "R")).unwrap();
        assert!(out.source_text.contains("X float64"));
        let out = generate(&request(&[r#"{"x": 1}"#, r#"{"x": 2}"#], "golang", "R")).unwrap();
        assert!(out.source_text.contains("X int64"));
    }

    #[test]
    fn optional_promotion_reaches_the_output() {
        let out = generate(&request(&[r#"{"a": 1}"#, r#"{}"#], "python", "R")).unwrap();
        assert!(out.source_text.contains("a: Optional[int]"), "{}", out.source_text);
    }
}
