use calver::{
    check_ecosystem_compliance, compare_versions, compute_next_version, latest_version,
    read_marker, validate_format, write_marker, BuildVersion, ComplianceError, Date, FormatError,
    MarkerError, Settings, TagSource, TagSourceError, DEFAULT_MARKER_PATH, VERSION_ENV_VAR,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{cmp::Ordering, collections::BTreeMap, path::PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Invalid CalVer format: {0}")]
    Format(#[from] FormatError),

    #[error("Version not PEP 440 compliant: {0}")]
    Compliance(#[from] ComplianceError),

    #[error("{0}")]
    Tags(#[from] TagSourceError),

    #[error("{0}")]
    Marker(#[from] MarkerError),

    #[error("Could not render JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No version information found")]
    NoVersionFound,
}

/// Calendar versioning (YYYY.MM.DD.MICRO) from git tags.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr. Otherwise the `CALVER_LOG` filter applies.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository to read tags from.
    #[arg(long, global = true, env = "CALVER_REPO", default_value = ".")]
    repo: PathBuf,

    /// Do not run `git fetch --tags` before reading tags.
    #[arg(long, global = true, env = "CALVER_NO_FETCH")]
    no_fetch: bool,

    /// Compute versions for this date instead of the current UTC date.
    #[arg(long, global = true, env = "CALVER_DATE", value_name = "YYYY-MM-DD")]
    date: Option<Date>,

    /// The version-marker file read by the packaging tool.
    #[arg(long, global = true, env = "CALVER_MARKER", default_value = DEFAULT_MARKER_PATH)]
    marker: PathBuf,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            repo: self.repo.clone(),
            fetch: !self.no_fetch,
            marker_path: self.marker.clone(),
            date: self.date,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculates the next version from the repository's tags and today's UTC date
    Calc {
        /// Also validate the format and PEP 440 compliance of the calculated version.
        #[arg(long)]
        check: bool,
    },

    /// Shows the current version from each available source
    Check {
        /// Version reported by the environment, used as one more source.
        #[arg(long, env = VERSION_ENV_VAR, value_name = "VERSION")]
        env_version: Option<String>,
    },

    /// Validates a version's format and PEP 440 compliance
    Validate {
        /// The version string to validate
        version: String,
    },

    /// Compares two versions
    Compare {
        /// The first version
        version1: String,

        /// The second version
        version2: String,
    },

    /// Shows the next version and what it was derived from
    Info,

    /// Calculates the next version and writes it to the version-marker file
    Write {
        /// Mark the version as a local dev build, stamped with the current Unix timestamp.
        #[arg(long)]
        dev: bool,
    },
}

#[derive(Serialize)]
struct CalcOutput {
    version: String,
}

#[derive(Serialize)]
struct CheckOutput {
    versions: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    version: &'a str,
    valid_format: bool,
    pep440_compliant: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct CompareOutput<'a> {
    version1: &'a str,
    version2: &'a str,
    comparison: &'static str,
}

#[derive(Serialize)]
struct InfoOutput {
    next_version: String,
    date: String,
    micro: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_version: Option<String>,
    tool_version: &'static str,
}

#[derive(Serialize)]
struct WriteOutput {
    version: String,
    path: String,
}

type Output = (String, i32);

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("calver=debug")
    } else {
        EnvFilter::try_from_env("CALVER_LOG").unwrap_or_else(|_| EnvFilter::new("calver=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(?cli, "parsed arguments");

    match do_work(&cli) {
        Ok((output, exit_code)) => {
            println!("{output}");
            std::process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn do_work(cli: &Cli) -> Result<Output, CliError> {
    let settings = cli.settings();
    let tags = settings.tag_source();
    run(cli, &settings, &tags)
}

fn run(cli: &Cli, settings: &Settings, tags: &dyn TagSource) -> Result<Output, CliError> {
    match &cli.command {
        Commands::Calc { check } => {
            let next = compute_next_version(&settings.today(), tags.tag_names()?);
            let rendered = next.to_string();
            if *check {
                validate_format(&rendered)?;
                check_ecosystem_compliance(&rendered)?;
            }
            render(cli.json, &CalcOutput { version: rendered }, |out| out.version.clone())
        }
        Commands::Check { env_version } => {
            check(cli.json, settings, tags, env_version.as_deref())
        }
        Commands::Validate { version } => validate(cli.json, version),
        Commands::Compare { version1, version2 } => {
            let comparison = match compare_versions(version1, version2)? {
                Ordering::Less => "<",
                Ordering::Greater => ">",
                Ordering::Equal => "==",
            };
            let output = CompareOutput {
                version1,
                version2,
                comparison,
            };
            render(cli.json, &output, |out| {
                format!("{} {} {}", out.version1, out.comparison, out.version2)
            })
        }
        Commands::Info => {
            let today = settings.today();
            let tag_names = tags.tag_names()?;
            let next = compute_next_version(&today, &tag_names);
            let output = InfoOutput {
                next_version: next.to_string(),
                date: next.date_string(),
                micro: next.micro(),
                current_version: latest_version(&tag_names).map(|v| v.to_string()),
                tool_version: env!("CARGO_PKG_VERSION"),
            };
            if cli.json {
                return Ok((serde_json::to_string_pretty(&output)?, 0));
            }
            let mut lines = vec![
                "Version Information:".to_string(),
                format!("  next_version: {}", output.next_version),
                format!("  date: {}", output.date),
                format!("  micro: {}", output.micro),
            ];
            if let Some(current) = &output.current_version {
                lines.push(format!("  current_version: {current}"));
            }
            lines.push(format!("  tool_version: {}", output.tool_version));
            Ok((lines.join("\n"), 0))
        }
        Commands::Write { dev } => {
            let next = compute_next_version(&settings.today(), tags.tag_names()?);
            let build = if *dev {
                BuildVersion::dev_now(next)
            } else {
                BuildVersion::release(next)
            };
            write_marker(&settings.marker_path, &build)?;
            let output = WriteOutput {
                version: build.to_string(),
                path: settings.marker_path.display().to_string(),
            };
            render(cli.json, &output, |out| out.version.clone())
        }
    }
}

/// Renders `output` as compact JSON, or as text with `text`.
fn render<T: Serialize>(
    json: bool,
    output: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<Output, CliError> {
    let rendered = if json {
        serde_json::to_string(output)?
    } else {
        text(output)
    };
    Ok((rendered, 0))
}

fn check(
    json: bool,
    settings: &Settings,
    tags: &dyn TagSource,
    env_version: Option<&str>,
) -> Result<Output, CliError> {
    let mut versions = BTreeMap::new();

    // every source is optional here, so failures only degrade the report
    match tags.tag_names() {
        Ok(tag_names) => {
            if let Some(latest) = latest_version(&tag_names) {
                versions.insert("git_tag", latest.to_string());
            }
        }
        Err(err) => warn!(%err, "could not read tags"),
    }

    if settings.marker_path.exists() {
        match read_marker(&settings.marker_path) {
            Ok(build) => {
                versions.insert("marker", build.to_string());
            }
            Err(err) => warn!(%err, "could not read version marker"),
        }
    }

    if let Some(version) = env_version.filter(|v| !v.trim().is_empty()) {
        versions.insert("env", version.trim().to_string());
    }

    if json {
        let output = CheckOutput { versions };
        return Ok((serde_json::to_string_pretty(&output)?, 0));
    }
    if versions.is_empty() {
        return Err(CliError::NoVersionFound);
    }

    let mut lines = vec!["Current versions:".to_string()];
    lines.extend(
        versions
            .iter()
            .map(|(source, version)| format!("  {source}: {version}")),
    );
    Ok((lines.join("\n"), 0))
}

fn validate(json: bool, version: &str) -> Result<Output, CliError> {
    let format_result = validate_format(version).map(|_| ());
    // compliance is only meaningful for well-formed versions
    let compliance_result = match &format_result {
        Ok(()) => check_ecosystem_compliance(version).map_err(CliError::from),
        Err(err) => Err(CliError::from(err.clone())),
    };

    if json {
        let output = ValidateOutput {
            version,
            valid_format: format_result.is_ok(),
            pep440_compliant: compliance_result.is_ok(),
            error: compliance_result.as_ref().err().map(|err| err.to_string()),
        };
        let exit_code = if compliance_result.is_ok() { 0 } else { 1 };
        return Ok((serde_json::to_string(&output)?, exit_code));
    }

    compliance_result?;
    Ok((
        format!("Version '{version}' is valid and PEP 440 compliant"),
        0,
    ))
}
