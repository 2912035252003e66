//! Command-line front end: load JSON samples → generate(language | all).
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::{GenerationConfig, NamingCase, OptionalRepr, TagSet, TimeRepr, Visibility};
use crate::pipeline::{generate, generate_all, GenerateError, GenerateRequest, Generated};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer struct/class/interface/dataclass definitions from JSON samples
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate a type definition for one target language
    Generate(GenerateOut),
    /// generate type definitions for every supported language
    All(AllOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat each input file as newline-delimited JSON (one sample per line)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct GenerationSettings {
    /// top-level type name
    #[arg(long, default_value = "Root")]
    root_name: String,

    /// JSON file with a full GenerationConfig; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// field identifier casing (default: the language's own convention)
    #[arg(long)]
    case: Option<NamingCase>,

    /// struct tag / annotation families, comma separated
    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<TagSet>>,

    /// member visibility
    #[arg(long)]
    visibility: Option<Visibility>,

    /// optional-field spelling (default: the language's idiom)
    #[arg(long)]
    optional_repr: Option<OptionalRepr>,

    /// keep timestamp-looking strings as plain strings
    #[arg(long, default_value_t = false)]
    time_as_string: bool,

    /// drop generated comments
    #[arg(long, default_value_t = false)]
    no_comments: bool,

    /// Go package header
    #[arg(long)]
    package: Option<String>,

    /// print the transport-style JSON response instead of bare source text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generation: GenerationSettings,

    /// target language (golang | java | typescript | python)
    #[arg(long, short)]
    language: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AllOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generation: GenerationSettings,

    /// output directory; one file per language (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_samples(&self) -> anyhow::Result<Vec<String>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut samples = Vec::new();
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read {}", source_path.display()))?;
            if self.ndjson {
                samples.extend(
                    source
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .map(str::to_string),
                );
            } else {
                samples.push(source);
            }
        }
        Ok(samples)
    }
}

impl GenerationSettings {
    fn build_config(&self) -> anyhow::Result<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => GenerationConfig::default(),
        };
        if let Some(case) = self.case {
            config.naming_case = Some(case);
        }
        if let Some(tags) = &self.tags {
            config.tag_sets = tags.clone();
        }
        if let Some(visibility) = self.visibility {
            config.visibility = visibility;
        }
        if let Some(repr) = self.optional_repr {
            config.optional_repr = Some(repr);
        }
        if self.time_as_string {
            config.time_repr = TimeRepr::String;
        }
        if self.no_comments {
            config.include_comments = false;
        }
        if let Some(package) = &self.package {
            config.package_name = package.clone();
        }
        Ok(config)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let samples = target.input_settings.load_samples()?;
                let config = target.generation.build_config()?;
                let request = GenerateRequest {
                    samples,
                    language: target.language.clone(),
                    root_name: target.generation.root_name.clone(),
                    config,
                };
                match generate(&request) {
                    Ok(generated) => {
                        report_warnings(&generated.warnings);
                        let text = if target.generation.json {
                            transport_success(&generated)
                        } else {
                            generated.source_text
                        };
                        write_output(target.out.as_deref(), &text)
                    }
                    Err(error) => fail(&error, target.generation.json),
                }
            }
            Command::All(target) => {
                let samples = target.input_settings.load_samples()?;
                let config = target.generation.build_config()?;
                let results =
                    match generate_all(&samples, &target.generation.root_name, &config) {
                        Ok(results) => results,
                        Err(error) => return fail(&error, target.generation.json),
                    };
                for (language, result) in results {
                    let generated = match result {
                        Ok(g) => g,
                        Err(error) => return fail(&error, target.generation.json),
                    };
                    report_warnings(&generated.warnings);
                    match target.out.as_ref() {
                        Some(dir) => {
                            std::fs::create_dir_all(dir)?;
                            let file = dir.join(format!(
                                "{}.{}",
                                target.generation.root_name.to_lowercase(),
                                language.extension()
                            ));
                            std::fs::write(&file, &generated.source_text)
                                .with_context(|| format!("failed to write {}", file.display()))?;
                        }
                        None => {
                            println!("// ---- {language} ----");
                            println!("{}", generated.source_text);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn transport_success(generated: &Generated) -> String {
    serde_json::json!({
        "success": true,
        "code": generated.source_text,
        "warnings": generated.warnings,
    })
    .to_string()
}

fn fail(error: &GenerateError, json: bool) -> anyhow::Result<()> {
    if json {
        let body = serde_json::json!({
            "success": false,
            "stage": error.stage().to_string(),
            "error": error.to_string(),
            "sample_index": error.sample_index(),
        });
        println!("{body}");
        std::process::exit(1);
    }
    eprintln!("{} [{}] {error}", "error:".red().bold(), error.stage());
    std::process::exit(1);
}

fn report_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
}

fn write_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn load_config_file(path: &Path) -> anyhow::Result<GenerationConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut de = serde_json::Deserializer::from_str(&text);
    let config = serde_path_to_error::deserialize(&mut de)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
