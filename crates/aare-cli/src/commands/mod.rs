use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;

use aare_core::{AppConfig, VerificationService, VerifyRequest};

use crate::cli::{Commands, OntologyCommand, VerifyArgs};

mod support;

use support::print_json;

pub fn run(command: Commands) -> Result<()> {
    let config = AppConfig::from_env();
    info!(storage = ?config.storage, cache_capacity = config.cache_capacity, "loaded configuration");
    let service = VerificationService::from_config(&config);

    match command {
        Commands::Serve(args) => aare_web::serve_web(service, &args.host, args.port),
        Commands::Ontology(args) => handle_ontology_command(&service, args.command),
        Commands::Verify(args) => handle_verify(&service, args),
    }
}

fn handle_ontology_command(service: &VerificationService, command: OntologyCommand) -> Result<()> {
    match command {
        OntologyCommand::List => print_json(&serde_json::json!({
            "ontologies": service.loader().list_available(),
        })),
        OntologyCommand::Show { name } => {
            let ontology = service.loader().load(&name);
            print_json(&*ontology)
        }
    }
}

fn handle_verify(service: &VerificationService, args: VerifyArgs) -> Result<()> {
    let text = match (args.text, args.text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("either --text or --text-file is required"),
    };
    if text.is_empty() {
        bail!("llm_output is required");
    }

    let mut request = VerifyRequest::new(text);
    if let Some(ontology) = args.ontology {
        request = request.with_ontology(ontology);
    }
    let report = service.verify(&request)?;
    print_json(&report)
}
