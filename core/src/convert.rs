//! # Conversion Pipeline
//!
//! descriptor file → method filter → union shape fix → spec assembler → render →
//! formatter → sink. Nothing is written unless every earlier stage succeeded.

use crate::assembler::{ApiInfo, SpecAssembler};
use crate::error::{AppError, AppResult};
use crate::filter::FilterSource;
use crate::method::load_methods;
use crate::output::{render, Formatter, OutputFormat, Sink};
use crate::patch::ACTIVITY_BADGE_FIX;
use crate::release::Release;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Placeholder in the output path replaced by the installation's version tag.
pub const VERSION_PLACEHOLDER: &str = "{VERSION}";

/// Validated configuration of one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Descriptor file.
    pub input: PathBuf,
    /// Output file; `None` writes JSON to stdout.
    pub output: Option<PathBuf>,
    /// Create missing parent directories of `output`.
    pub create_parents: bool,
    /// Allow- or deny-list.
    pub filter: Option<FilterSource>,
    /// Inject the token issuing operation.
    pub add_login_token_path: bool,
    /// Apply the activity badge union fix.
    pub fix_union_shape: bool,
    /// Coerce defaults into their declared types.
    pub fix_defaults: bool,
    /// Tag operations with their component.
    pub add_tags: bool,
    /// External formatter settings.
    pub formatter: Formatter,
    /// Installation root holding `version.php`.
    pub source_root: Option<PathBuf>,
    /// Explicit document version; wins over the installation release.
    pub api_version: Option<String>,
}

impl ConvertOptions {
    /// Options with every switch on and output to stdout.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            create_parents: false,
            filter: None,
            add_login_token_path: true,
            fix_union_shape: true,
            fix_defaults: true,
            add_tags: true,
            formatter: Formatter::default(),
            source_root: None,
            api_version: None,
        }
    }
}

/// One conversion run.
#[derive(Debug)]
pub struct Converter {
    options: ConvertOptions,
    release: Option<Release>,
    sink: Sink,
}

impl Converter {
    /// Resolves installation metadata and the output destination.
    pub fn new(options: ConvertOptions) -> AppResult<Self> {
        let release = options
            .source_root
            .as_deref()
            .map(Release::from_root)
            .transpose()?;
        if let Some(release) = &release {
            debug!("Found installation:\n{}", release);
        }

        let sink = match &options.output {
            None => Sink::Stdout,
            Some(path) => Sink::File {
                path: resolve_output_path(path, release.as_ref())?,
                create_parents: options.create_parents,
            },
        };

        Ok(Self {
            options,
            release,
            sink,
        })
    }

    /// The resolved destination.
    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Runs the whole pipeline and writes the result.
    pub fn run(&self) -> AppResult<()> {
        self.sink.prepare()?;

        let doc = self.build_document()?;

        let format = match &self.sink {
            Sink::Stdout => OutputFormat::Json,
            Sink::File { path, .. } => OutputFormat::for_destination(Some(path)),
        };
        let bytes = render(&doc, format)?;
        let bytes = self.options.formatter.format(bytes, format)?;

        self.sink.write(&bytes)?;
        if let Sink::File { path, .. } = &self.sink {
            info!("Results written to {}", path.display());
        }
        Ok(())
    }

    /// Loads, filters, patches and assembles the document without writing it.
    pub fn build_document(&self) -> AppResult<Value> {
        let options = &self.options;
        info!("Starting conversion of {} ...", options.input.display());

        let mut methods = load_methods(&options.input)?;
        debug!(methods = methods.len(), "Loaded method descriptors");

        if let Some(source) = &options.filter {
            let label = match source {
                FilterSource::Allow(_) => "allow-list",
                FilterSource::Deny(_) => "deny-list",
            };
            info!("Applying {}: {} ...", label, source.path().display());
            methods = source.load()?.apply(methods);
            debug!(methods = methods.len(), "Methods after filtering");
        }

        if options.fix_union_shape {
            info!("Applying activity badge fix ...");
            if !ACTIVITY_BADGE_FIX.apply(&mut methods) {
                debug!(method = ACTIVITY_BADGE_FIX.method, "Union shape fix target not found");
            }
        }

        info!(
            "Converting (fixing defaults: {}, adding tags: {}) ...",
            options.fix_defaults, options.add_tags
        );
        let assembler = SpecAssembler {
            info: self.api_info(),
            add_login_token_path: options.add_login_token_path,
            fix_defaults: options.fix_defaults,
            add_tags: options.add_tags,
        };
        assembler.assemble(&methods)
    }

    fn api_info(&self) -> ApiInfo {
        let info = ApiInfo::default();
        match (&self.options.api_version, &self.release) {
            (Some(version), _) => info.with_version(version.clone()),
            (None, Some(release)) => info.with_version(release.release.clone()),
            (None, None) => info,
        }
    }
}

/// Substitutes [`VERSION_PLACEHOLDER`] in `path`.
fn resolve_output_path(path: &Path, release: Option<&Release>) -> AppResult<PathBuf> {
    let raw = path.to_string_lossy();
    if !raw.contains(VERSION_PLACEHOLDER) {
        return Ok(path.to_path_buf());
    }
    let tag = release
        .ok_or_else(|| {
            AppError::General(format!(
                "{} in output path requires an installation root",
                VERSION_PLACEHOLDER
            ))
        })?
        .version_tag()
        .ok_or_else(|| AppError::General("Could not derive version tag from release".into()))?;
    Ok(PathBuf::from(raw.replace(VERSION_PLACEHOLDER, &tag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const VERSION_PHP: &str = "$version = 2024100702.00;\n$release = '4.5.2 (Build: 20250210)';\n$branch = '405';\n$maturity = MATURITY_STABLE;\n";

    #[test]
    fn test_output_path_placeholder() {
        let release = Release::parse(Path::new("."), VERSION_PHP).unwrap();
        let path = resolve_output_path(Path::new("out/openapi@{VERSION}.json"), Some(&release))
            .unwrap();
        assert_eq!(path, PathBuf::from("out/openapi@v4.5.2.json"));

        let plain = resolve_output_path(Path::new("out/openapi.json"), None).unwrap();
        assert_eq!(plain, PathBuf::from("out/openapi.json"));

        let res = resolve_output_path(Path::new("openapi@{VERSION}.json"), None);
        assert!(matches!(res, Err(AppError::General(_))));
    }

    #[test]
    fn test_api_version_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("version.php"), VERSION_PHP).unwrap();

        let mut options = ConvertOptions::new("webservices.json");
        options.source_root = Some(dir.path().to_path_buf());
        let converter = Converter::new(options.clone()).unwrap();
        assert_eq!(converter.api_info().version, "4.5.2 (Build: 20250210)");

        options.api_version = Some("1.2.3".into());
        let converter = Converter::new(options).unwrap();
        assert_eq!(converter.api_info().version, "1.2.3");

        let converter = Converter::new(ConvertOptions::new("webservices.json")).unwrap();
        assert_eq!(converter.api_info().version, "0.0.0");
        assert_eq!(converter.sink(), &Sink::Stdout);
    }

    #[test]
    fn test_missing_installation_fails_early() {
        let mut options = ConvertOptions::new("webservices.json");
        options.source_root = Some(PathBuf::from("/no/such/installation"));
        assert!(matches!(Converter::new(options), Err(AppError::Io(_))));
    }
}
