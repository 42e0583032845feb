use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "entrypoint-finder")]
#[command(about = "Scan compiled class directories for main classes and resolve classes across classpath contexts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Find all classes below ROOT declaring `public static void main(String[])`.
    Scan {
        root: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Resolve a class by name across the default and extra classpath contexts.
    Resolve {
        class_name: String,

        /// Extra classpath context; entries separated by the platform path
        /// separator. Repeatable, one context per flag.
        #[arg(long = "classpath", value_name = "LIST")]
        classpath: Vec<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Collect every locator for a resource across all classpath contexts.
    Resources {
        name: String,

        #[arg(long = "classpath", value_name = "LIST")]
        classpath: Vec<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
