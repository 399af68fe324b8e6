//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Build and run AutoStep test projects.
#[derive(Parser, Debug)]
#[command(name = "autostep", version, about = "Build and run AutoStep test projects")]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level verbs.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile and link the project.
    Build(ProjectArgs),
    /// Build the project, then execute its tests.
    Run(ProjectArgs),
    /// Create a new project from a template.
    New {
        /// Template to use.
        #[command(subcommand)]
        template: Template,
    },
}

/// Project templates for `new`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// A plain test project.
    Project(NewArgs),
    /// A project set up for web testing.
    Web(NewArgs),
}

impl Template {
    /// Arguments shared by every template.
    pub fn args(&self) -> &NewArgs {
        match self {
            Self::Project(args) | Self::Web(args) => args,
        }
    }
}

/// Options for `new`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NewArgs {
    /// Directory to create the project in (default: current directory).
    #[arg(short, long)]
    pub directory: Option<PathBuf>,
}

/// Options shared by `build` and `run`.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory (default: current directory).
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: `<directory>/autostep.config.json`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Configuration override as `key=value`; a bare `key` means `true`.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Log at trace level and emit compiler diagnostics.
    #[arg(long)]
    pub diagnostic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_build_options() {
        let cli = Cli::try_parse_from([
            "autostep", "build", "-d", "proj", "-o", "a=1", "--option", "flag", "-v", "--diagnostic",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.directory, Some(PathBuf::from("proj")));
        assert_eq!(args.options, vec!["a=1", "flag"]);
        assert!(args.diagnostic);
        assert!(args.config.is_none());
    }

    #[test]
    fn parses_new_web() {
        let cli = Cli::try_parse_from(["autostep", "new", "web", "-d", "site"]).unwrap();
        assert_matches!(
            cli.command,
            Command::New { template: Template::Web(NewArgs { directory: Some(_) }) }
        );
    }

    #[test]
    fn unknown_template_is_a_usage_error() {
        assert!(Cli::try_parse_from(["autostep", "new", "desktop"]).is_err());
    }
}
