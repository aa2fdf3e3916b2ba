use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};


#[derive(Debug, Parser)]
#[command(name = "aare")]
#[command(about = "Compliance verification for LLM output", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the HTTP verification endpoint.
    Serve(ServeArgs),
    Ontology(OntologyArgs),
    /// Verify text locally and print the response body.
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct OntologyArgs {
    #[command(subcommand)]
    pub command: OntologyCommand,
}

#[derive(Debug, Subcommand)]
pub enum OntologyCommand {
    List,
    Show { name: String },
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
    pub text: Option<String>,
    #[arg(long)]
    pub text_file: Option<PathBuf>,
    #[arg(long)]
    pub ontology: Option<String>,
}
