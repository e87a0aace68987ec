use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use placerank::config::{self, Config};
use placerank::dataset;
use placerank::formulas::FormulaRegistry;
use placerank::output;
use placerank::scoring::{
    recalculate_rankings, schema_warnings, Domain, Entity, ScoringEngine, WeightScope,
};
use placerank::weights::{self, CustomWeights, SliderSet, WeightStore};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

const DEFAULT_TOP: usize = 10;

#[derive(Args, Debug, Default)]
struct RankArgs {
    /// Ranking domain (defaults to the config's default_domain)
    #[arg(short, long)]
    domain: Option<String>,

    /// Number of entries to show
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Tab-separated output for scripting
    #[arg(long, conflicts_with = "json")]
    tsv: bool,

    /// JSON output including full breakdowns
    #[arg(long)]
    json: bool,

    /// Ignore saved weights and use the schema defaults
    #[arg(long)]
    defaults: bool,

    /// Entity file to rank instead of the configured dataset
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum WeightsAction {
    /// Show the current slider values (default)
    Show,
    /// Set one slider and rebalance the others to keep the total at 100
    Set {
        /// Category id (or metric id for metric-scoped domains)
        id: String,
        /// New value, 0-100
        value: u32,
    },
    /// Apply a named preset
    Preset { name: String },
    /// List the presets available for the domain
    Presets,
    /// Drop saved weights and go back to the schema defaults
    Reset,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank entities of a domain (default if no subcommand)
    Rank(RankArgs),
    /// Show the full score breakdown of one entity
    Explain {
        /// Entity id
        id: String,

        #[arg(short, long)]
        domain: Option<String>,

        #[arg(long)]
        defaults: bool,

        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// View or change the customized weights of a domain
    Weights {
        #[arg(short, long, global = true)]
        domain: Option<String>,

        #[command(subcommand)]
        action: Option<WeightsAction>,
    },
    /// Re-weight a precomputed rankings file with the saved category weights
    Recalc {
        /// Rankings JSON file (`all_rankings` list of name/overall_score/breakdown)
        file: PathBuf,

        /// Domain whose saved weights apply (defaults to the config's default_domain)
        #[arg(short, long)]
        domain: Option<String>,

        #[arg(short = 'n', long)]
        top: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Check the schema, presets and formula registries
    Validate,
    /// Write a default config file
    Init {
        /// Overwrite an existing config without asking
        #[arg(long)]
        force: bool,

        /// Accept all defaults without prompting
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "placerank")]
#[command(about = "Weighted ranking of localities, restaurants and hotels", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/placerank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Schema file (YAML, or website JSON) replacing the config's domains
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_with(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Rank(RankArgs::default()));
    let start_time = Instant::now();

    if let Commands::Init { force, yes } = command {
        match config::run_init_wizard(cli.config.clone(), force, yes) {
            Ok(path) => {
                println!("Config written to {}", path.display());
                println!("Run `placerank validate` to check it, then `placerank rank`.");
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => exit_with(EXIT_CONFIG, format!("Init failed: {:#}", e)),
        }
    }

    // Load config
    let config_path = match cli.config {
        Some(path) => path,
        None => config::get_config_path().unwrap_or_else(|e| exit_with(EXIT_CONFIG, format!("Config error: {:#}", e))),
    };
    let mut config = match config::load_config(Some(config_path.clone())) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    if let Err(e) = placerank::telemetry::init(config.log_level.as_deref(), cli.verbose) {
        exit_with(EXIT_CONFIG, format!("Config error: {}", e));
    }

    if let Some(ref schema_path) = cli.schema {
        match dataset::load_schema(schema_path) {
            Ok(schema) => config.domains = schema.domains,
            Err(e) => exit_with(EXIT_CONFIG, format!("Schema error: {}", e)),
        }
    }

    // Validate config at startup
    if let Err(errors) = config.validate() {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let engine = match ScoringEngine::new(config.schema()) {
        Ok(engine) => engine,
        Err(e) => exit_with(EXIT_CONFIG, format!("Schema error: {}", e)),
    };
    let base_dir = config::config_base_dir(&config_path);

    match command {
        Commands::Rank(args) => {
            let domain_id = resolve_domain(&config, args.domain.as_deref());
            let domain = lookup_domain(&engine, &domain_id);
            let entities = load_entities(&config, &base_dir, &domain_id, domain, args.data.as_deref());
            let custom = if args.defaults {
                None
            } else {
                saved_weights(&domain_id, domain)
            };

            let top = args.top.or(config.top).unwrap_or(DEFAULT_TOP);
            let ranked = match engine.top_n(&entities, &domain_id, top, custom.as_ref()) {
                Ok(ranked) => ranked,
                Err(e) => exit_with(EXIT_CONFIG, format!("Scoring error: {}", e)),
            };

            if args.json {
                match serde_json::to_string_pretty(&ranked) {
                    Ok(json) => println!("{}", json),
                    Err(e) => exit_with(EXIT_FAILURE, format!("Failed to serialize rankings: {}", e)),
                }
            } else if args.tsv {
                let tsv = output::format_tsv(&ranked);
                if !tsv.is_empty() {
                    println!("{}", tsv);
                }
            } else {
                let use_colors = output::should_use_colors();
                println!("{}", output::format_ranked_table(&ranked, use_colors));
                if ranked.iter().any(|r| r.breakdown.incomplete()) {
                    println!();
                    println!("* some metrics missing; see `placerank explain ID`");
                }
            }

            debug!(
                domain = %domain_id,
                entities = entities.len(),
                elapsed = ?start_time.elapsed(),
                "ranked"
            );
        }
        Commands::Explain {
            id,
            domain,
            defaults,
            data,
        } => {
            let domain_id = resolve_domain(&config, domain.as_deref());
            let domain = lookup_domain(&engine, &domain_id);
            let entities = load_entities(&config, &base_dir, &domain_id, domain, data.as_deref());
            let custom = if defaults {
                None
            } else {
                saved_weights(&domain_id, domain)
            };

            let ranked = match engine.rank(&entities, &domain_id, custom.as_ref()) {
                Ok(ranked) => ranked,
                Err(e) => exit_with(EXIT_CONFIG, format!("Scoring error: {}", e)),
            };
            let Some(item) = ranked.iter().find(|r| r.entity.id == id) else {
                exit_with(
                    EXIT_DATA,
                    format!("No entity '{}' in domain '{}'", id, domain_id),
                );
            };

            println!("{}", output::format_breakdown(item, output::should_use_colors()));
        }
        Commands::Weights { domain, action } => {
            let domain_id = resolve_domain(&config, domain.as_deref());
            let domain = lookup_domain(&engine, &domain_id);
            run_weights(&config, &domain_id, domain, action.unwrap_or(WeightsAction::Show));
        }
        Commands::Recalc {
            file,
            domain,
            top,
            json,
        } => {
            let domain_id = resolve_domain(&config, domain.as_deref());
            let domain = lookup_domain(&engine, &domain_id);
            if domain.weight_scope != WeightScope::Category {
                exit_with(
                    EXIT_CONFIG,
                    format!("Domain '{}' uses metric weights; recalc needs category weights", domain_id),
                );
            }

            let entries = match dataset::load_rankings(&file) {
                Ok(entries) => entries,
                Err(e) => exit_with(EXIT_DATA, format!("Data error: {:#}", anyhow::Error::from(e))),
            };
            let (_, store) = open_weight_store();
            let sliders = current_sliders(&store, &domain_id, domain);
            let custom = CustomWeights::from_sliders(&sliders, WeightScope::Category);

            let mut recalculated = recalculate_rankings(&entries, &custom);
            if let Some(n) = top {
                recalculated.truncate(n);
            }

            if json {
                match serde_json::to_string_pretty(&recalculated) {
                    Ok(out) => println!("{}", out),
                    Err(e) => exit_with(EXIT_FAILURE, format!("Failed to serialize rankings: {}", e)),
                }
            } else {
                println!(
                    "{}",
                    output::format_recalculated(&recalculated, output::should_use_colors())
                );
            }
        }
        Commands::Validate => {
            for warning in schema_warnings(engine.schema()) {
                println!("warning: {}", warning);
            }
            for domain_id in engine.schema().domain_ids() {
                match config.dataset_path(domain_id, &base_dir) {
                    Some(path) if !path.exists() => {
                        println!("warning: datasets.{}: {} does not exist", domain_id, path.display());
                    }
                    Some(_) => {}
                    None => println!("warning: no dataset configured for '{}'", domain_id),
                }
            }
            println!(
                "Config OK: {} domain(s) in {}",
                engine.schema().domains.len(),
                config_path.display()
            );
        }
        Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

fn resolve_domain(config: &Config, requested: Option<&str>) -> String {
    match requested.or_else(|| config.default_domain()) {
        Some(id) => id.to_string(),
        None => exit_with(EXIT_CONFIG, "No domains configured"),
    }
}

fn lookup_domain<'a>(engine: &'a ScoringEngine, domain_id: &str) -> &'a Domain {
    match engine.domain(domain_id) {
        Ok(domain) => domain,
        Err(e) => {
            let known: Vec<&str> = engine.schema().domain_ids().collect();
            exit_with(
                EXIT_CONFIG,
                format!("Config error: {} (known: {})", e, known.join(", ")),
            )
        }
    }
}

/// Load the domain's entities and fill in derived metrics.
fn load_entities(
    config: &Config,
    base_dir: &Path,
    domain_id: &str,
    domain: &Domain,
    data_override: Option<&Path>,
) -> Vec<Entity> {
    let path = match data_override {
        Some(path) => path.to_path_buf(),
        None => match config.dataset_path(domain_id, base_dir) {
            Some(path) => path,
            None => exit_with(
                EXIT_CONFIG,
                format!("No dataset configured for '{}'. Add it under `datasets:` or pass --data", domain_id),
            ),
        },
    };

    let entities = match dataset::load_entities(&path) {
        Ok(entities) => entities,
        Err(e) => exit_with(EXIT_DATA, format!("Data error: {:#}", anyhow::Error::from(e))),
    };

    match FormulaRegistry::for_domain(domain_id, domain) {
        Ok(registry) if !registry.is_empty() => registry.derive_all(&entities),
        Ok(_) => entities,
        Err(e) => exit_with(EXIT_CONFIG, format!("Config error: {}", e)),
    }
}

fn open_weight_store() -> (PathBuf, WeightStore) {
    let path = match weights::get_weights_path() {
        Ok(path) => path,
        Err(e) => exit_with(EXIT_FAILURE, format!("Weight store error: {:#}", e)),
    };
    match weights::load_weight_store(&path) {
        Ok(store) => (path, store),
        Err(e) => exit_with(EXIT_FAILURE, format!("Weight store error: {:#}", e)),
    }
}

/// Saved sliders for the domain, or its defaults when nothing usable is saved.
fn current_sliders(store: &WeightStore, domain_id: &str, domain: &Domain) -> SliderSet {
    let defaults = SliderSet::for_domain(domain);
    match store.restore(domain_id, &defaults) {
        Ok(Some(sliders)) => sliders,
        Ok(None) => defaults,
        Err(e) => {
            warn!(domain = %domain_id, error = %e, "ignoring saved weights");
            defaults
        }
    }
}

/// Custom weights from the store, `None` when the domain has none saved.
fn saved_weights(domain_id: &str, domain: &Domain) -> Option<CustomWeights> {
    let (_, store) = open_weight_store();
    store.get(domain_id)?;
    let sliders = current_sliders(&store, domain_id, domain);
    Some(CustomWeights::from_sliders(&sliders, domain.weight_scope))
}

fn run_weights(config: &Config, domain_id: &str, domain: &Domain, action: WeightsAction) {
    let (store_path, mut store) = open_weight_store();
    let mut sliders = current_sliders(&store, domain_id, domain);
    let use_colors = output::should_use_colors();

    let changed = match action {
        WeightsAction::Show => {
            let source = if store.get(domain_id).is_some() {
                "saved"
            } else {
                "defaults"
            };
            println!("Weights for {} ({})", domain_id, source);
            println!("{}", output::format_sliders(&sliders, use_colors));
            false
        }
        WeightsAction::Set { id, value } => {
            if let Err(e) = sliders.auto_adjust(&id, value) {
                exit_with(EXIT_CONFIG, format!("Weight error: {}", e));
            }
            true
        }
        WeightsAction::Preset { name } => {
            if let Err(e) = weights::apply_preset(&mut sliders, domain_id, config.presets_for(domain_id), &name) {
                exit_with(EXIT_CONFIG, format!("Weight error: {}", e));
            }
            true
        }
        WeightsAction::Presets => {
            match config.presets_for(domain_id) {
                Some(presets) if !presets.is_empty() => {
                    for name in presets.keys() {
                        println!("{}", name);
                    }
                }
                _ => println!("No presets for {}", domain_id),
            }
            false
        }
        WeightsAction::Reset => {
            if store.reset(domain_id) {
                if let Err(e) = weights::save_weight_store(&store_path, &store) {
                    exit_with(EXIT_FAILURE, format!("Failed to save weights: {:#}", e));
                }
                println!("Weights for {} reset to defaults", domain_id);
            } else {
                println!("No saved weights for {}", domain_id);
            }
            false
        }
    };

    if changed {
        if let Err(e) = store.save(domain_id, &sliders) {
            exit_with(EXIT_CONFIG, format!("Weight error: {}", e));
        }
        if let Err(e) = weights::save_weight_store(&store_path, &store) {
            exit_with(EXIT_FAILURE, format!("Failed to save weights: {:#}", e));
        }
        println!("Weights for {} saved", domain_id);
        println!("{}", output::format_sliders(&sliders, use_colors));
    }
}
