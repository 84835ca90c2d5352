use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ed_cpt_core::{
    CandidateMatch, CodingReport, Extractor, ExtractorConfig, KnowledgeBase, ProcedureCategory,
    ThresholdOverrides,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ed-cpt")]
#[command(about = "Extract CPT codes from emergency department notes")]
struct Cli {
    /// Knowledge base JSON file (defaults to the bundled ED code table)
    #[arg(long, global = true)]
    knowledge_base: Option<PathBuf>,

    /// Extractor config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the candidate inclusion threshold
    #[arg(long, global = true)]
    inclusion_threshold: Option<f64>,

    /// Override the procedure threshold
    #[arg(long, global = true)]
    procedure_threshold: Option<f64>,

    /// Override the manual review threshold
    #[arg(long, global = true)]
    review_threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the final code set and print a coding report
    Extract {
        /// Note file, or "-" to read from stdin
        note: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show ranked candidates with score breakdowns, before business rules
    Explain {
        /// Note file, or "-" to read from stdin
        note: String,
    },
    /// List knowledge base codes
    Codes {
        /// Only list one category (tag or display name)
        #[arg(long)]
        category: Option<ProcedureCategory>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("ed_cpt=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let knowledge_base = load_knowledge_base(cli.knowledge_base.as_deref())?;
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Extract { note, format } => {
            let text = read_note(&note)?;
            let extractor = Extractor::with_config(&knowledge_base, config)?;
            let report = extractor.extract_with_details(&text);
            tracing::info!(
                report_id = %report.report_id,
                codes = report.total_codes_found,
                "coding report generated"
            );

            match format {
                OutputFormat::Text => print_report(&report),
                OutputFormat::Json => println!("{}", report.to_json()?),
                OutputFormat::Csv => print!("{}", report.to_csv()),
            }
        }
        Commands::Explain { note } => {
            let text = read_note(&note)?;
            let extractor = Extractor::with_config(&knowledge_base, config)?;
            let candidates = extractor.explain(&text);
            let kept = extractor.extract(&text);

            if candidates.is_empty() {
                println!("No candidates above {}.", config.inclusion_threshold);
            }
            tracing::debug!(candidates = candidates.len(), kept = kept.len(), "explained note");
            for candidate in &candidates {
                print_candidate(candidate, candidate_status(candidate, &kept));
            }
        }
        Commands::Codes { category } => {
            let codes: Vec<_> = match category {
                Some(category) => knowledge_base.by_category(category).collect(),
                None => knowledge_base.iter().collect(),
            };
            for code in codes {
                println!(
                    "{}  {:<20} {}",
                    code.code(),
                    code.category().display_name(),
                    code.definition().description
                );
            }
        }
    }

    Ok(())
}

fn load_knowledge_base(path: Option<&Path>) -> Result<KnowledgeBase> {
    match path {
        Some(path) => KnowledgeBase::from_path(path)
            .with_context(|| format!("Failed to load knowledge base from {}", path.display())),
        None => KnowledgeBase::bundled().context("Failed to load bundled knowledge base"),
    }
}

fn load_config(cli: &Cli) -> Result<ExtractorConfig> {
    let config = match &cli.config {
        Some(path) => ExtractorConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    let overrides = ThresholdOverrides {
        inclusion_threshold: cli.inclusion_threshold,
        procedure_threshold: cli.procedure_threshold,
        review_threshold: cli.review_threshold,
    };
    config
        .with_overrides(overrides)
        .context("Invalid threshold override")
}

/// Whether a ranked candidate survived the business rules.
fn candidate_status(candidate: &CandidateMatch, kept: &[CandidateMatch]) -> &'static str {
    if kept.iter().any(|k| k.code == candidate.code) {
        "kept"
    } else {
        "dropped"
    }
}

fn read_note(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read note from stdin")?;
        return Ok(text);
    }

    let path = Path::new(source);
    if !path.is_file() {
        bail!("Note file not found: {}", source);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read note from {}", source))
}

fn print_report(report: &CodingReport) {
    println!("Report: {}", report.report_id);
    println!("Analyzed: {}", report.analyzed_at);
    println!("Knowledge base: {}", report.knowledge_base_fingerprint);
    println!();

    if report.cpt_codes.is_empty() {
        println!("No CPT codes found.");
    } else {
        println!("CPT codes ({}):", report.total_codes_found);
        for code in &report.cpt_codes {
            println!(
                "  {}  {:.3}  [{}] {}",
                code.code, code.confidence, code.category, code.description
            );
        }
    }
    println!();

    let analysis = &report.note_analysis;
    println!(
        "Note: {} words, {} complexity indicators, {} complexity",
        analysis.word_count, analysis.complexity_indicators, analysis.estimated_complexity
    );

    if !report.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for recommendation in &report.recommendations {
            println!("  - {}", recommendation);
        }
    }
}

fn print_candidate(candidate: &CandidateMatch, status: &str) {
    let breakdown = &candidate.score_breakdown;
    println!(
        "{}  {:.3}  {:<7}  keywords {}/{}  patterns {}/{}  {}",
        candidate.code,
        candidate.confidence,
        status,
        breakdown.keywords_matched,
        breakdown.keyword_count,
        breakdown.patterns_matched,
        breakdown.pattern_count,
        candidate.description
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_status() {
        let kb = KnowledgeBase::bundled().unwrap();
        let extractor = Extractor::new(&kb);
        let note = "Simple repair of superficial wound with sutures, 3 cm";

        let candidates = extractor.explain(note);
        let kept = extractor.extract(note);
        let statuses: Vec<(&str, &str)> = candidates
            .iter()
            .map(|c| (c.code.as_str(), candidate_status(c, &kept)))
            .collect();

        assert_eq!(statuses, vec![("12001", "kept"), ("12002", "dropped")]);
    }

    #[test]
    fn test_flags_override_thresholds() {
        let cli = Cli::parse_from(["ed-cpt", "--procedure-threshold", "0.45", "codes"]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.procedure_threshold, 0.45);
        assert_eq!(config.inclusion_threshold, ExtractorConfig::default().inclusion_threshold);
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let cli = Cli::parse_from(["ed-cpt", "--review-threshold", "2.0", "codes"]);
        assert!(load_config(&cli).is_err());
    }
}
