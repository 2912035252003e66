//! json-to-struct: infer compilable type definitions from JSON samples.
//!
//! The engine is a pure, stateless pipeline — parse → infer → resolve →
//! emit — over one or more JSON documents. Identical inputs always yield
//! identical output; each call owns its own struct registry and nothing is
//! shared across calls, so concurrent generations need no coordination.
//!
//! ```
//! use json_to_struct::config::GenerationConfig;
//! use json_to_struct::pipeline::{generate, GenerateRequest};
//!
//! let out = generate(&GenerateRequest {
//!     samples: vec![r#"{"id": 1, "name": "John", "active": true}"#.to_string()],
//!     language: "golang".to_string(),
//!     root_name: "User".to_string(),
//!     config: GenerationConfig::default(),
//! })
//! .unwrap();
//! assert!(out.source_text.contains("type User struct {"));
//! ```

pub mod cli;
pub mod config;
pub mod emit;
pub mod infer;
pub mod ir;
pub mod parse;
pub mod pipeline;
pub mod resolve;

pub use config::{GenerationConfig, Language};
pub use pipeline::{generate, generate_all, GenerateError, GenerateRequest, Generated, Stage};
