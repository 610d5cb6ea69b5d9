//! Configuration lifecycle: load the file config, merge CLI overrides, build session settings.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use linefetch_core::{SessionConfig, Terminator};

use crate::cli::Args;

/// Line-based `key = value` file configuration for linefetch defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    /// Default output directory for downloads.
    pub(crate) output_dir: Option<PathBuf>,
    /// Default TCP connect timeout in seconds.
    pub(crate) connect_timeout_secs: Option<u64>,
    /// Default stall timeout in seconds.
    pub(crate) idle_timeout_secs: Option<u64>,
    /// Default request terminator.
    pub(crate) terminator: Option<Terminator>,
    /// Keep partial files on abort.
    pub(crate) keep_partial: Option<bool>,
    /// Default verbosity mode.
    pub(crate) verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against CLI constraints.
    pub(crate) fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("idle_timeout_secs", self.idle_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

/// Which CLI values were given explicitly (they win over the file config).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) output_dir: bool,
    pub(crate) connect_timeout: bool,
    pub(crate) idle_timeout: bool,
    pub(crate) terminator: bool,
    pub(crate) keep_partial: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) args: Args,
    pub(crate) connect_timeout: Duration,
    pub(crate) session: SessionConfig,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let command = Args::command();
    let matches = command.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let sources = CliValueSources {
        output_dir: is_commandline_value(&matches, "output_dir"),
        connect_timeout: is_commandline_value(&matches, "connect_timeout"),
        idle_timeout: is_commandline_value(&matches, "idle_timeout"),
        terminator: is_commandline_value(&matches, "terminator"),
        keep_partial: is_commandline_value(&matches, "keep_partial"),
        verbose: is_commandline_value(&matches, "verbose"),
        quiet: is_commandline_value(&matches, "quiet"),
    };
    (args, sources)
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Loads the file config from the default path, merges it under the CLI values,
/// and builds the session settings.
pub(crate) fn resolve_settings(args: Args, cli_sources: &CliValueSources) -> Result<Settings> {
    let file_config = load_default_file_config()?;
    let args = apply_config_defaults(args, cli_sources, file_config.as_ref());

    Ok(Settings {
        connect_timeout: Duration::from_secs(args.connect_timeout),
        session: SessionConfig {
            output_dir: args.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            terminator: args.terminator,
            keep_partial: args.keep_partial,
            idle_timeout: Duration::from_secs(args.idle_timeout),
        },
        args,
    })
}

pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Args {
    let Some(file_config) = file_config else {
        return args;
    };

    if !cli_sources.output_dir
        && args.output_dir.is_none()
        && let Some(output_dir) = &file_config.output_dir
    {
        args.output_dir = Some(output_dir.clone());
    }

    if !cli_sources.connect_timeout
        && let Some(secs) = file_config.connect_timeout_secs
    {
        args.connect_timeout = secs;
    }

    if !cli_sources.idle_timeout
        && let Some(secs) = file_config.idle_timeout_secs
    {
        args.idle_timeout = secs;
    }

    if !cli_sources.terminator
        && let Some(terminator) = file_config.terminator
    {
        args.terminator = terminator;
    }

    if !cli_sources.keep_partial
        && let Some(keep_partial) = file_config.keep_partial
    {
        args.keep_partial = keep_partial;
    }

    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.verbosity
    {
        match verbosity {
            VerbositySetting::Default => {}
            VerbositySetting::Verbose => args.verbose = 1,
            VerbositySetting::Debug => args.verbose = 2,
            VerbositySetting::Quiet => args.quiet = true,
        }
    }

    args
}

/// Log filter used when `RUST_LOG` is not set.
pub(crate) fn default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/linefetch/config.toml`
/// 2. `$HOME/.config/linefetch/config.toml`
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("linefetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("linefetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub(crate) fn load_default_file_config() -> Result<Option<FileConfig>> {
    let Some(path) = resolve_default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    load_file_config(&path).map(Some)
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;

        match key {
            "output_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `output_dir` value on line {line_no}"))?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_no}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "idle_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `idle_timeout_secs` value on line {line_no}")
                })?;
                cfg.idle_timeout_secs = Some(parsed);
            }
            "terminator" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `terminator` value on line {line_no}"))?;
                let terminator = parsed
                    .parse::<Terminator>()
                    .map_err(|message| anyhow::anyhow!(message))
                    .with_context(|| format!("Invalid `terminator` value on line {line_no}"))?;
                cfg.terminator = Some(terminator);
            }
            "keep_partial" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `keep_partial` value on line {line_no}"))?;
                cfg.keep_partial = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `verbosity` value on line {line_no}"))?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    raw_value
        .parse::<u64>()
        .context("Expected a non-negative integer")
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected boolean value (true or false)"),
    }
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
