use std::path::PathBuf;

use clap::Parser;

/// Relint - a lint daemon client that keeps slow linters warm
///
/// Every invocation is relayed to the long-running `relintd` daemon, which
/// is started automatically on first use. The file to lint is read from
/// standard input and the daemon's report is written to standard output.
#[derive(Parser, Debug)]
#[command(name = "relint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this configuration, overriding the project config file
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Lint the text read from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Specify the filename to process the standard input as
    #[arg(long = "stdin-filename", value_name = "name")]
    pub stdin_filename: Option<String>,

    /// Automatically fix problems
    #[arg(long, conflicts_with = "fix_dry_run")]
    pub fix: bool,

    /// Automatically fix problems without saving the changes
    #[arg(long = "fix-dry-run")]
    pub fix_dry_run: bool,

    /// Print the fixed text to standard output (requires --stdin)
    #[arg(long = "fix-to-stdout", requires = "stdin")]
    pub fix_to_stdout: bool,

    /// Output format for the lint report
    #[arg(long, value_name = "name", default_value = "stylish")]
    pub format: String,

    /// Use this file as the ignore file
    #[arg(long = "ignore-path", value_name = "path")]
    pub ignore_path: Option<PathBuf>,

    /// Additional pattern of files to ignore
    #[arg(long = "ignore-pattern", value_name = "pattern")]
    pub ignore_pattern: Option<String>,

    /// Disable use of ignore files and patterns
    #[arg(long = "no-ignore")]
    pub no_ignore: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["relint"]);
        assert!(!cli.stdin);
        assert!(!cli.fix);
        assert_eq!(cli.format, "stylish");
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_fix_flags_conflict() {
        let result = Cli::try_parse_from(["relint", "--fix", "--fix-dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fix_to_stdout_requires_stdin() {
        let result = Cli::try_parse_from(["relint", "--fix-to-stdout"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["relint", "--stdin", "--fix-to-stdout"]);
        assert!(cli.fix_to_stdout);
    }

    #[test]
    fn test_format_override() {
        let cli = Cli::parse_from(["relint", "--format", "compact"]);
        assert_eq!(cli.format, "compact");
    }
}
