use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slidedeck")]
#[command(author, version, about)]
#[command(long_about = "A markdown slide deck presenter.\n\n\
    Write your slides in markdown and step through them in a window.\n\n\
    Examples:\n  \
    slidedeck talk.md                 Present fullscreen\n  \
    slidedeck talk.md --windowed      Present in a window\n  \
    slidedeck talk.md --watch         Reload when the file changes\n  \
    slidedeck talk.md --exit-at-end   Close after the last slide")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide: a 1-indexed number (clamped to the deck)
    /// or a slide's @name
    #[arg(long, global = false, value_parser = parse_slide_ref)]
    pub slide: Option<SlideRef>,

    /// Stepping past the last slide closes the presentation
    #[arg(long, global = false)]
    pub exit_at_end: bool,

    /// Reload the deck when the file changes
    #[arg(long, global = false)]
    pub watch: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.transition, controls.hide_after_ms)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Start slide given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideRef {
    /// 1-indexed
    Number(usize),
    /// Matches a slide's `@name:` directive
    Name(String),
}

fn parse_slide_ref(value: &str) -> Result<SlideRef, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("expected a slide number or name".to_string());
    }
    Ok(match value.parse::<usize>() {
        Ok(n) => SlideRef::Number(n),
        Err(_) => SlideRef::Name(value.to_string()),
    })
}

/// Options for presenting a deck, gathered from the command line.
#[derive(Debug, Clone)]
pub struct PresentOptions {
    pub file: PathBuf,
    pub windowed: bool,
    pub slide: Option<SlideRef>,
    pub exit_at_end: bool,
    pub watch: bool,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("slidedeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(PresentOptions {
                        file,
                        windowed: self.windowed,
                        slide: self.slide,
                        exit_at_end: self.exit_at_end,
                        watch: self.watch,
                    })
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_present_flags() {
        let cli = Cli::try_parse_from([
            "slidedeck",
            "talk.md",
            "--windowed",
            "--slide",
            "4",
            "--exit-at-end",
            "--watch",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("talk.md")));
        assert!(cli.windowed && cli.exit_at_end && cli.watch);
        assert_eq!(cli.slide, Some(SlideRef::Number(4)));
    }

    #[test]
    fn test_slide_by_name() {
        let cli = Cli::try_parse_from(["slidedeck", "talk.md", "--slide", "demo"]).unwrap();
        assert_eq!(cli.slide, Some(SlideRef::Name("demo".to_string())));
        assert!(Cli::try_parse_from(["slidedeck", "talk.md", "--slide", " "]).is_err());
    }

    #[test]
    fn test_log_filter() {
        let filter = |args: &[&str]| Cli::try_parse_from(args).unwrap().log_filter();
        assert_eq!(filter(&["slidedeck"]), "info");
        assert_eq!(filter(&["slidedeck", "-v"]), "debug");
        assert_eq!(filter(&["slidedeck", "-vv"]), "trace");
        assert_eq!(filter(&["slidedeck", "-q", "-v"]), "warn");
    }

    #[test]
    fn test_config_set_subcommand() {
        let cli =
            Cli::try_parse_from(["slidedeck", "config", "set", "defaults.theme", "dark"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommands::Set { .. }
            })
        ));
    }
}
