//! CLI module for studyforge.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// studyforge - topic in, study guide out
///
/// Chains four LLM agents (search, scrape, synthesize, format) to turn a topic
/// into a markdown study guide with questions and answers.
#[derive(Parser, Debug)]
#[command(name = "studyforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a study guide for a topic without starting the server
    Generate {
        /// The topic to study
        topic: String,

        /// Also copy the markdown to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check credentials and output directory
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["studyforge", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            other => panic!("Expected Serve, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_generate_with_globals() {
        let cli = Cli::try_parse_from([
            "studyforge",
            "generate",
            "Quantum Computing",
            "-o",
            "guide.md",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Generate { topic, output } => {
                assert_eq!(topic, "Quantum Computing");
                assert_eq!(output.as_deref(), Some("guide.md"));
            }
            other => panic!("Expected Generate, got {:?}", other),
        }
    }
}
