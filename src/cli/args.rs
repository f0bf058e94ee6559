//! Command-line interface definitions.

use crate::config::CONFIG_FILE;
use crate::core::{BuildMode, TaskName};
use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Front-end asset pipeline: markup, styles, scripts, images, sprites and fonts
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (searched upward from the working directory)
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Clean, then run every task once
    #[command(visible_alias = "b")]
    Build(TaskArgs),

    /// Clean, build, then watch sources and serve with live reload
    #[command(visible_alias = "dev")]
    Develop {
        #[command(flatten)]
        args: TaskArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Copy markup files into the output root
    Markup(TaskArgs),

    /// Compile, prefix and minify stylesheets
    Styles(TaskArgs),

    /// Resolve includes and minify scripts
    Scripts(TaskArgs),

    /// Optimize images
    Images(TaskArgs),

    /// Pack `img/png` icons into a raster sprite
    Sprite(TaskArgs),

    /// Fold `img/svg` icons into a symbol sprite
    #[command(name = "svg-sprite")]
    SvgSprite(TaskArgs),

    /// Convert TTF fonts to WOFF2 with `@font-face` stylesheets
    Fontgen(TaskArgs),

    /// Copy fonts into the output root
    Fonts(TaskArgs),

    /// Delete outputs, generated artifacts and caches
    Clean,
}

/// Arguments shared by every task command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TaskArgs {
    /// Build mode (default: production for `build`, development otherwise)
    #[arg(short, long, value_enum)]
    pub mode: Option<BuildMode>,
}

impl Cli {
    /// Port override for `develop`.
    pub fn port(&self) -> Option<u16> {
        match self.command {
            Commands::Develop { port, .. } => port,
            _ => None,
        }
    }

    /// Interface override for `develop`.
    pub fn interface(&self) -> Option<IpAddr> {
        match self.command {
            Commands::Develop { interface, .. } => interface,
            _ => None,
        }
    }
}

impl Commands {
    /// Effective build mode for this command.
    pub fn mode(&self) -> BuildMode {
        let (args, default) = match self {
            Self::Build(args) => (args, BuildMode::Production),
            Self::Develop { args, .. } => (args, BuildMode::Development),
            Self::Clean => return BuildMode::default(),
            Self::Markup(args)
            | Self::Styles(args)
            | Self::Scripts(args)
            | Self::Images(args)
            | Self::Sprite(args)
            | Self::SvgSprite(args)
            | Self::Fontgen(args)
            | Self::Fonts(args) => (args, BuildMode::Development),
        };
        args.mode.unwrap_or(default)
    }

    /// The single task behind a task command.
    pub fn task(&self) -> Option<TaskName> {
        Some(match self {
            Self::Markup(_) => TaskName::Markup,
            Self::Styles(_) => TaskName::Styles,
            Self::Scripts(_) => TaskName::Scripts,
            Self::Images(_) => TaskName::Images,
            Self::Sprite(_) => TaskName::Sprite,
            Self::SvgSprite(_) => TaskName::SvgSprite,
            Self::Fontgen(_) => TaskName::FontConvert,
            Self::Fonts(_) => TaskName::Fonts,
            Self::Build(_) | Self::Develop { .. } | Self::Clean => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("assetflow").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(parse(&["build"]).command.mode(), BuildMode::Production);
        assert_eq!(parse(&["develop"]).command.mode(), BuildMode::Development);
        assert_eq!(parse(&["styles"]).command.mode(), BuildMode::Development);
        assert_eq!(
            parse(&["styles", "--mode", "production"]).command.mode(),
            BuildMode::Production
        );
    }

    #[test]
    fn test_task_commands() {
        assert_eq!(parse(&["svg-sprite"]).command.task(), Some(TaskName::SvgSprite));
        assert_eq!(parse(&["fontgen"]).command.task(), Some(TaskName::FontConvert));
        assert_eq!(parse(&["clean"]).command.task(), None);
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["scripts", "--verbose", "-C", "other.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn test_develop_overrides() {
        let cli = parse(&["develop", "--port", "8080", "-i", "0.0.0.0"]);
        assert_eq!(cli.port(), Some(8080));
        assert_eq!(cli.interface(), Some("0.0.0.0".parse().unwrap()));
        assert_eq!(parse(&["build"]).port(), None);
    }
}
