#![deny(missing_docs)]

//! # ws2oas Core
//!
//! Converts webservice method descriptors into an OpenAPI 3.1 document.

/// Shared error types.
pub mod error;

/// Descriptor tree decoding.
pub mod descriptor;

/// Method records and descriptor file loading.
pub mod method;

/// Default value coercion.
pub mod coercion;

/// Descriptor → JSON Schema synthesis.
pub mod synthesizer;

/// Corrective descriptor patches.
pub mod patch;

/// Allow-list / deny-list filtering.
pub mod filter;

/// Component naming helpers.
pub mod naming;

/// OpenAPI document assembly.
pub mod assembler;

/// Installation release metadata.
pub mod release;

/// Rendering, formatting and writing.
pub mod output;

/// End-to-end conversion.
pub mod convert;

pub use assembler::{ApiInfo, SpecAssembler};
pub use coercion::{coerce_default, SchemaType};
pub use convert::{ConvertOptions, Converter};
pub use descriptor::{Descriptor, Flag, Shape};
pub use error::{AppError, AppResult};
pub use filter::{FilterSource, MethodFilter};
pub use method::{load_methods, parse_methods, MethodRecord, MethodSet};
pub use output::{Formatter, FormatterPolicy, OutputFormat, Sink};
pub use patch::{UnionShapeFix, ACTIVITY_BADGE_FIX};
pub use release::Release;
pub use synthesizer::{resolve_type, synthesize, SchemaNode, TypeSet};
