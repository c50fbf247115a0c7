use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use group_trails::algorithms::GroupSelector;
use group_trails::utils::metrics::{AlgorithmComparison, RecommendationMetrics, RegretBaseline, Winner};
use group_trails::{
    Catalog, GreedyRegretSelector, GroupMember, ParetoSelector, RecommenderConfig, Selection,
};

/// group-trails: recommend hiking trails that work for a whole group.
///
/// Reads a trail catalog and a group description, filters the catalog,
/// and runs the greedy minimax-regret and/or Pareto selectors.
#[derive(Debug, Parser)]
#[command(name = "group-trails", version, about, long_about = None)]
struct Cli {
    /// Trail catalog: `.csv` with a header row, or a JSON array, `{"trails": [...]}` or NDJSON.
    #[arg(long)]
    catalog: PathBuf,

    /// Group members as a JSON array or `{"members": [...]}`.
    #[arg(long)]
    group: PathBuf,

    /// TOML run configuration (defaults are used when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Selector to run.
    #[arg(long, value_enum, default_value_t = Method::Both)]
    method: Method,

    /// Number of trails to recommend; overrides the config file.
    #[arg(short = 'k', long = "count")]
    k: Option<usize>,

    /// Rescale member weights to sum to 1 instead of rejecting the group.
    #[arg(long)]
    normalize_weights: bool,

    /// Emit the full report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    Greedy,
    Pareto,
    Both,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupFile {
    Wrapped { members: Vec<GroupMember> },
    List(Vec<GroupMember>),
}

impl GroupFile {
    fn into_members(self) -> Vec<GroupMember> {
        match self {
            GroupFile::Wrapped { members } => members,
            GroupFile::List(members) => members,
        }
    }
}

#[derive(Debug, Serialize)]
struct RunReport {
    candidates: usize,
    skipped_records: usize,
    selections: Vec<Selection>,
    metrics: Vec<RecommendationMetrics>,
    comparison: Option<AlgorithmComparison>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("group_trails=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "run_failed", error = %e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> group_trails::Result<()> {
    let mut config = match &cli.config {
        Some(path) => RecommenderConfig::load(path)?,
        None => RecommenderConfig::default(),
    };
    if let Some(k) = cli.k {
        config.k = k;
    }
    config.normalize_weights |= cli.normalize_weights;

    let catalog = Catalog::load(&cli.catalog)?;
    let group_file: GroupFile = serde_json::from_str(&fs::read_to_string(&cli.group)?)?;
    let mut group = group_file.into_members();
    if config.normalize_weights {
        group = group.iter().map(GroupMember::normalized).collect();
    }
    GroupMember::validate_group(&group)?;

    let candidates = catalog.filter(&config.filter);
    info!(
        event = "candidates_ready",
        catalog = catalog.len(),
        candidates = candidates.len(),
        members = group.len(),
        k = config.k,
    );

    let mut selectors: Vec<Box<dyn GroupSelector>> = Vec::new();
    if matches!(cli.method, Method::Greedy | Method::Both) {
        selectors.push(Box::new(
            GreedyRegretSelector::new(config.greedy).with_params(config.model),
        ));
    }
    if matches!(cli.method, Method::Pareto | Method::Both) {
        selectors.push(Box::new(
            ParetoSelector::new(config.pareto).with_params(config.model),
        ));
    }

    let selections: Vec<Selection> = selectors
        .iter()
        .map(|selector| selector.select(&candidates, &group, config.k))
        .collect();

    let metrics: Vec<RecommendationMetrics> = selections
        .iter()
        .map(|selection| {
            RecommendationMetrics::compute_with(
                selection,
                &group,
                RegretBaseline::CandidatePool(&candidates),
                &config.model,
            )
        })
        .collect();

    let comparison = match selections.as_slice() {
        [first, second] => Some(AlgorithmComparison::compare_with(first, second, &group, &config.model)),
        _ => None,
    };

    let report = RunReport {
        candidates: candidates.len(),
        skipped_records: catalog.skipped(),
        selections,
        metrics,
        comparison,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &group);
    }
    Ok(())
}

fn print_report(report: &RunReport, group: &[GroupMember]) {
    println!(
        "Candidates: {} ({} catalog records skipped)",
        report.candidates, report.skipped_records
    );

    for (selection, metrics) in report.selections.iter().zip(&report.metrics) {
        println!("\n{} (k = {})", selection.algorithm, selection.k);
        println!("------------------------------------------");

        if selection.is_empty() {
            println!("No trails selected.");
            continue;
        }

        for (rank, (trail, trail_report)) in selection.trails.iter().zip(&metrics.trails).enumerate() {
            println!(
                "{}. {} [{}] {} - {:.1} km, {:.1} h, {} m",
                rank + 1,
                trail.id,
                trail.difficulty,
                trail.name,
                trail.distance_km,
                trail.estimated_time_hours,
                trail.elevation_gain_m
            );
            let utilities: Vec<String> = trail_report
                .member_utilities
                .iter()
                .enumerate()
                .map(|(m, u)| format!("{} {:.0}", group[m].label(m), u))
                .collect();
            println!(
                "   avg {:.1}, fairness {:.1}, consensus {:.2} | {}",
                trail_report.satisfaction.avg,
                trail_report.satisfaction.fairness,
                trail_report.satisfaction.consensus,
                utilities.join(", ")
            );
        }

        if let Some(frontier) = selection.frontier_size {
            println!("  Pareto frontier size: {}", frontier);
        }
        println!("  Regret vs candidates: {:.2}", metrics.regret);
        println!("  Diversity: {:.3}", metrics.diversity);
        for member in &metrics.members {
            println!(
                "  {}: average utility {}%, matches {}%",
                member.member, member.average_utility, member.match_percentage
            );
        }
    }

    if let Some(comparison) = &report.comparison {
        println!("\nComparison: {} vs {}", comparison.first, comparison.second);
        println!("  Shared trails: {:?}", comparison.overlap);
        for criterion in &comparison.criteria {
            let winner = match criterion.winner {
                Winner::First => comparison.first.to_string(),
                Winner::Second => comparison.second.to_string(),
                Winner::Neither => "tie".to_string(),
            };
            println!(
                "  {}: {:.2} vs {:.2} -> {}",
                criterion.criterion, criterion.first, criterion.second, winner
            );
        }
    }
}
