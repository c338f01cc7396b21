#![deny(missing_docs)]

//! # Convert Command
//!
//! Maps command line arguments onto [`ConvertOptions`] and runs the conversion.

use std::path::PathBuf;

use ws2oas_core::{
    AppError, AppResult, ConvertOptions, Converter, FilterSource, Formatter, FormatterPolicy,
};

/// Arguments for the convert command.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Method descriptor file produced by the extractor.
    pub input: PathBuf,

    /// Path where to save the OpenAPI document.
    /// A path ending in `json` gets JSON, anything else YAML.
    /// `{VERSION}` is replaced by the installation version (requires --source-root).
    /// Git placeholders such as `{COMMIT}` and `{TAG}` are not expanded.
    /// If not provided, prints JSON to stdout.
    #[clap(short, long, env = "WS2OAS_OUTPATH")]
    pub outpath: Option<PathBuf>,

    /// Make parent directories of the path given with --outpath.
    #[clap(long)]
    pub parents: bool,

    /// Path to a file containing the allowed methods, one per line.
    #[clap(long, conflicts_with = "denylist")]
    pub allowlist: Option<PathBuf>,

    /// Path to a file containing the disallowed methods, one per line.
    #[clap(long)]
    pub denylist: Option<PathBuf>,

    /// Do not add the path /login/token.php.
    #[clap(long)]
    pub skip_add_login_token_path: bool,

    /// Keep core_course_get_contents::modules::activitybadge an object instead of
    /// an object or a list.
    #[clap(long)]
    pub skip_fix_union_shape: bool,

    /// Do not coerce default values to match their types.
    #[clap(long)]
    pub skip_fix_defaults: bool,

    /// Do not tag operations with the method's component.
    #[clap(long)]
    pub skip_add_tags: bool,

    /// Do not format the result with prettier.
    #[clap(long)]
    pub skip_prettier: bool,

    /// Fail when prettier is not found instead of skipping it.
    #[clap(long, conflicts_with = "skip_prettier")]
    pub require_prettier: bool,

    /// Formatter executable.
    #[clap(long, default_value = "prettier", env = "WS2OAS_PRETTIER")]
    pub prettier: String,

    /// Installation root containing version.php.
    #[clap(short = 's', long, env = "WS2OAS_SOURCE_ROOT")]
    pub source_root: Option<PathBuf>,

    /// Document version; defaults to the installation release.
    #[clap(long)]
    pub api_version: Option<String>,
}

impl ConvertArgs {
    /// Whether the document goes to stdout (logs must then go to stderr).
    pub fn writes_to_stdout(&self) -> bool {
        self.outpath.is_none()
    }

    /// Builds the validated core configuration.
    pub fn to_options(&self) -> AppResult<ConvertOptions> {
        let filter = FilterSource::from_paths(self.allowlist.clone(), self.denylist.clone())?;

        let policy = if self.skip_prettier {
            FormatterPolicy::Disabled
        } else if self.require_prettier {
            FormatterPolicy::Required
        } else {
            FormatterPolicy::IfAvailable
        };

        Ok(ConvertOptions {
            input: self.input.clone(),
            output: self.outpath.clone(),
            create_parents: self.parents,
            filter,
            add_login_token_path: !self.skip_add_login_token_path,
            fix_union_shape: !self.skip_fix_union_shape,
            fix_defaults: !self.skip_fix_defaults,
            add_tags: !self.skip_add_tags,
            formatter: Formatter {
                program: self.prettier.clone(),
                policy,
            },
            source_root: self.source_root.clone(),
            api_version: self.api_version.clone(),
        })
    }
}

/// Executes the conversion.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &ConvertArgs) -> AppResult<()> {
    if !args.input.is_file() {
        return Err(AppError::General(format!(
            "Input file not found: {:?}",
            args.input
        )));
    }
    for list in [&args.allowlist, &args.denylist].into_iter().flatten() {
        if !list.is_file() {
            return Err(AppError::General(format!(
                "Filter list not found: {:?}",
                list
            )));
        }
    }

    let options = args.to_options()?;
    Converter::new(options)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(input: PathBuf) -> ConvertArgs {
        ConvertArgs {
            input,
            outpath: None,
            parents: false,
            allowlist: None,
            denylist: None,
            skip_add_login_token_path: false,
            skip_fix_union_shape: false,
            skip_fix_defaults: false,
            skip_add_tags: false,
            skip_prettier: true,
            require_prettier: false,
            prettier: "prettier".into(),
            source_root: None,
            api_version: None,
        }
    }

    #[test]
    fn test_switches_default_on() {
        let mut a = args("in.json".into());
        a.skip_prettier = false;
        let options = a.to_options().unwrap();
        assert!(options.add_login_token_path);
        assert!(options.fix_union_shape);
        assert!(options.fix_defaults);
        assert!(options.add_tags);
        assert_eq!(options.formatter.policy, FormatterPolicy::IfAvailable);
        assert!(a.writes_to_stdout());
    }

    #[test]
    fn test_skip_switches() {
        let mut a = args("in.json".into());
        a.skip_add_login_token_path = true;
        a.skip_fix_union_shape = true;
        a.skip_fix_defaults = true;
        a.skip_add_tags = true;
        let options = a.to_options().unwrap();
        assert!(!options.add_login_token_path);
        assert!(!options.fix_union_shape);
        assert!(!options.fix_defaults);
        assert!(!options.add_tags);
        assert_eq!(options.formatter.policy, FormatterPolicy::Disabled);
    }

    #[test]
    fn test_both_lists_rejected() {
        let mut a = args("in.json".into());
        a.allowlist = Some("allow.txt".into());
        a.denylist = Some("deny.txt".into());
        assert!(matches!(a.to_options(), Err(AppError::ConflictingFilters)));
    }

    #[test]
    fn test_execute_writes_yaml() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("webservices.json");
        fs::write(
            &input,
            r#"{ "core_webservice_get_site_info": { "loginrequired": true, "component": "core_webservice" } }"#,
        )
        .unwrap();
        let out = dir.path().join("openapi.yml");

        let mut a = args(input);
        a.outpath = Some(out.clone());
        execute(&a).unwrap();

        let yaml = fs::read_to_string(&out).unwrap();
        assert!(yaml.contains("operationId: core_webservice_get_site_info"));
        assert!(yaml.contains("/login/token.php"));
    }

    #[test]
    fn test_execute_missing_input() {
        let a = args("/no/such/webservices.json".into());
        match execute(&a) {
            Err(AppError::General(msg)) => assert!(msg.contains("Input file not found")),
            other => panic!("Wrong result: {other:?}"),
        }
    }

    #[test]
    fn test_execute_missing_filter_list() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("webservices.json");
        fs::write(&input, "{}").unwrap();

        let mut a = args(input);
        a.denylist = Some(dir.path().join("deny.txt"));
        match execute(&a) {
            Err(AppError::General(msg)) => assert!(msg.contains("Filter list not found")),
            other => panic!("Wrong result: {other:?}"),
        }
    }
}
