use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::constants::KNOWLEDGE_BASE_ENV_VAR;
use triage_core::{
    resolve_knowledge_base_path, CoreConfig, CoreResult, InMemoryFacilityStore,
    InMemoryPatientStore, KnowledgeSource, TriageRequest, TriageService, VitalSigns,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Symptom triage and population insights CLI")]
struct Cli {
    /// Knowledge base YAML file (defaults to $TRIAGE_KNOWLEDGE_BASE, then the bundled table)
    #[arg(long, global = true)]
    knowledge_base: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a set of symptoms
    Assess {
        /// Reported symptom (repeatable)
        #[arg(long = "symptom", short = 's')]
        symptoms: Vec<String>,
        /// Patient age in years
        #[arg(long)]
        age: i32,
        /// Patient gender (male, female, other)
        #[arg(long)]
        gender: String,
        /// Vital sign reading as key=value, e.g. temperature=39.5 (repeatable)
        #[arg(long = "vital", short = 'v', value_parser = parse_vital)]
        vitals: Vec<(String, serde_json::Value)>,
    },
    /// List the conditions in the knowledge base
    Conditions,
    /// Aggregate insights over a JSON array of patient records
    Insights {
        /// Path to the records file
        records: PathBuf,
    },
    /// Capacity and staffing statistics over a JSON array of facility records
    Facilities {
        /// Path to the facilities file
        records: PathBuf,
    },
    /// Headline health metrics across patient and facility records
    Health {
        /// JSON array of patient records
        #[arg(long)]
        patients: Option<PathBuf>,
        /// JSON array of facility records
        #[arg(long)]
        facilities: Option<PathBuf>,
    },
    /// Print the active knowledge base as YAML
    ExportKnowledge,
}

/// Split `key=value`; numeric values become JSON numbers, anything else stays a string.
fn parse_vital(input: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {input:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing vital sign name in {input:?}"));
    }
    let value = value.trim();
    let json = value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), json))
}

/// Both stores for the health overview; an omitted file means an empty store.
fn load_stores(
    patients: Option<&PathBuf>,
    facilities: Option<&PathBuf>,
) -> CoreResult<(InMemoryPatientStore, InMemoryFacilityStore)> {
    let patients = match patients {
        Some(path) => InMemoryPatientStore::load_json(path)?,
        None => InMemoryPatientStore::new(),
    };
    let facilities = match facilities {
        Some(path) => InMemoryFacilityStore::load_json(path)?,
        None => InMemoryFacilityStore::new(),
    };
    Ok((patients, facilities))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let override_path = cli
        .knowledge_base
        .or_else(|| std::env::var_os(KNOWLEDGE_BASE_ENV_VAR).map(PathBuf::from));
    let knowledge_base_path = resolve_knowledge_base_path(override_path)?;
    let cfg = Arc::new(CoreConfig::new(knowledge_base_path));

    let service = TriageService::new(cfg).context("failed to initialise triage service")?;

    let source = match service.config().knowledge_source() {
        KnowledgeSource::Bundled => "bundled".to_string(),
        KnowledgeSource::File(path) => path.display().to_string(),
    };
    tracing::info!(
        knowledge_base = %source,
        conditions = service.conditions().len(),
        "triage service ready"
    );

    match cli.command {
        Some(Commands::Assess {
            symptoms,
            age,
            gender,
            vitals,
        }) => {
            let vital_signs =
                (!vitals.is_empty()).then(|| vitals.into_iter().collect::<VitalSigns>());
            let request = TriageRequest {
                symptoms,
                age,
                gender,
                vital_signs,
            };
            match service.triage_request(&request) {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(e) => eprintln!("Error triaging symptoms: {}", e),
            }
        }
        Some(Commands::Conditions) => {
            for condition in service.conditions() {
                println!(
                    "{} [{}]: {}",
                    condition.display_name(),
                    condition.base_urgency(),
                    condition.symptoms().join(", ")
                );
            }
        }
        Some(Commands::Insights { records }) => match InMemoryPatientStore::load_json(&records) {
            Ok(store) => {
                let summary = service.get_health_insights(&store)?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            Err(e) => eprintln!("Error loading records from {}: {}", records.display(), e),
        },
        Some(Commands::Facilities { records }) => {
            match InMemoryFacilityStore::load_json(&records) {
                Ok(store) => {
                    let stats = service.get_facility_insights(&store)?;
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                Err(e) => eprintln!("Error loading facilities from {}: {}", records.display(), e),
            }
        }
        Some(Commands::Health {
            patients,
            facilities,
        }) => match load_stores(patients.as_ref(), facilities.as_ref()) {
            Ok((patient_store, facility_store)) => {
                let metrics = service.get_health_metrics(&patient_store, &facility_store)?;
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            }
            Err(e) => eprintln!("Error loading records: {}", e),
        },
        Some(Commands::ExportKnowledge) => {
            print!("{}", service.conditions().render()?);
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}
