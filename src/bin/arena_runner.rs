//! Headless Arena Runner
//!
//! Runs a policy-vs-policy arena battle and prints the result as JSON or
//! text. Roles can come from a JSON file; without one a default warrior,
//! archer, and guardian lineup fights a mirror of itself.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use arena::battle::{Battle, BattleConfig, BattleOutcome, RoleSpec, TargetingPolicy};
use arena::battle::events::BattleEvent;
use arena::map::coord::Topology;

#[derive(Parser, Debug)]
#[command(name = "arena_runner")]
#[command(about = "Run a headless arena battle and output the result")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 10)]
    width: u32,

    /// Grid height in cells
    #[arg(long, default_value_t = 10)]
    height: u32,

    /// Grid topology: ortho4, ortho8, or hex
    #[arg(long, default_value = "ortho8")]
    topology: String,

    /// Maximum rounds before the battle is a draw
    #[arg(long, default_value_t = 100)]
    turn_limit: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file holding an array of role specs to spawn
    #[arg(long)]
    roles: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every battle event to stderr as it is replayed
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct ArenaResult {
    outcome: String,
    winner: Option<String>,
    turns: u32,
    survivors: Vec<String>,
    seed: u64,
    events: Vec<BattleEvent>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let topology = match args.topology.as_str() {
        "ortho4" => Topology::Orthogonal4,
        "ortho8" => Topology::Orthogonal8,
        "hex" => Topology::HexAxial,
        other => {
            eprintln!("Unknown topology '{}', expected ortho4, ortho8, or hex", other);
            return ExitCode::FAILURE;
        }
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = BattleConfig {
        width: args.width,
        height: args.height,
        topology,
        turn_limit: args.turn_limit,
        seed,
    };

    let roles = match &args.roles {
        Some(path) => match load_roles(path) {
            Ok(roles) => roles,
            Err(e) => {
                eprintln!("Failed to load roles from '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => default_roles(),
    };

    let mut battle = Battle::new(&config);
    for role in &roles {
        if let Err(e) = battle.spawn(role) {
            eprintln!("Failed to spawn '{}': {}", role.name, e);
            return ExitCode::FAILURE;
        }
    }

    let outcome = battle.run();

    if args.verbose {
        for event in battle.events().iter() {
            eprintln!("  [{}] {}", event.turn, event.description);
        }
    }

    let winner = match &outcome {
        BattleOutcome::Winner(faction) => Some(faction.to_string()),
        BattleOutcome::Draw => None,
    };
    let result = ArenaResult {
        outcome: match &outcome {
            BattleOutcome::Winner(_) => "winner".to_string(),
            BattleOutcome::Draw => "draw".to_string(),
        },
        winner,
        turns: battle.turn_number(),
        survivors: battle
            .living_fighters()
            .map(|f| format!("{} [{}] {}/{} hp", f.name, f.faction, f.health, f.max_health))
            .collect(),
        seed,
        events: battle.events().iter().cloned().collect(),
    };

    match args.format.as_str() {
        "text" => {
            println!("Arena Result");
            println!("============");
            match &result.winner {
                Some(faction) => println!("Winner: {}", faction),
                None => println!("Draw"),
            }
            println!("Turns: {}", result.turns);
            for survivor in &result.survivors {
                println!("  {}", survivor);
            }
            println!("Seed: {}", result.seed);
        }
        _ => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

fn load_roles(path: &str) -> Result<Vec<RoleSpec>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let roles: Vec<RoleSpec> = serde_json::from_str(&text)?;
    if roles.is_empty() {
        return Err("role file holds no fighters".into());
    }
    Ok(roles)
}

/// Mirror-match lineup: warrior, archer, and guardian on each side
fn default_roles() -> Vec<RoleSpec> {
    let side = |faction: &str| {
        vec![
            RoleSpec {
                name: format!("{} Warrior", faction),
                faction: faction.to_string(),
                level: 3,
                weapon: Some("long sword".to_string()),
                armor: Some("chain mail".to_string()),
                shield: None,
                ammunition: 0,
                policy: TargetingPolicy::GreatestThreat,
            },
            RoleSpec {
                name: format!("{} Archer", faction),
                faction: faction.to_string(),
                level: 2,
                weapon: Some("bow".to_string()),
                armor: Some("leather armor".to_string()),
                shield: None,
                ammunition: 20,
                policy: TargetingPolicy::LowestHealth,
            },
            RoleSpec {
                name: format!("{} Guardian", faction),
                faction: faction.to_string(),
                level: 3,
                weapon: Some("mace".to_string()),
                armor: Some("scale mail".to_string()),
                shield: Some("large shield".to_string()),
                ammunition: 0,
                policy: TargetingPolicy::Defensive,
            },
        ]
    };
    let mut roles = side("Crimson");
    roles.extend(side("Azure"));
    roles
}
