//! create-ros-recipe - Yocto recipe generator for ROS packages
//!
//! Usage:
//!   create-ros-recipe -g <repository> <name> <version>   Generate a recipe
//!   create-ros-recipe -h                                 Show help
//!
//! Settings beyond the three arguments come from the environment, see
//! `ros_recipe::config`.

use anyhow::{Context, Result};
use clap::Parser;
use ros_recipe::{output, RecipeBuilder, RecipeError, Settings};
use std::process::ExitCode;

/// Number of values `--generate` takes
const GENERATE_ARITY: usize = 3;

/// Exit code for a malformed command line
const EXIT_USAGE: u8 = 2;

const USAGE: &str = "\
Usage of commands:

-h/--help
-g <repository-name> <package-name> <package-version>
  Example: create-ros-recipe -g OctoMap octomap-ros 0.4.0";

const COMMANDS: &str = "\
Summary of commands:

-h/--help                        - prints commands and example
-g/--generate                    - generates recipe of ros package";

#[derive(Parser)]
#[command(name = "create-ros-recipe")]
#[command(about = "Generate a Yocto recipe for a ROS package hosted on GitHub")]
#[command(after_help = format!("{}\n\n{}", USAGE, COMMANDS))]
struct Cli {
    /// Generate the recipe of a ROS package
    #[arg(
        short = 'g',
        long = "generate",
        alias = "generates",
        num_args = 0..=GENERATE_ARITY,
        value_names = ["REPOSITORY", "NAME", "VERSION"]
    )]
    generate: Option<Vec<String>>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (repository, name, version) = match cli.generate.as_deref() {
        Some([repository, name, version]) => (repository, name, version),
        other => {
            let err = RecipeError::InvalidArguments {
                expected: GENERATE_ARITY,
                got: other.map_or(0, <[String]>::len),
            };
            output::error(&format!("Please provide 3 arguments ({})", err));
            println!("{}\n", USAGE);
            println!("{}", COMMANDS);
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    let mut builder =
        RecipeBuilder::new(repository, name, version).with_settings(Settings::from_env());
    builder
        .generate()
        .with_context(|| format!("Failed to generate recipe for {} {}", name, version))?;

    Ok(ExitCode::SUCCESS)
}
