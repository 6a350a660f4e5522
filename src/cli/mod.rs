//! # CLI Module
//!
//! Command-line front end. Owns everything presentational: the symptom
//! checklist, tier labels and colors, and the recommendations shown with
//! each tier.
//!
//! ## Usage
//! ```bash
//! # Full assessment: image match + symptoms -> risk tier
//! canscan assess --corpus ~/datasets/reference --image scan.png \
//!     --symptom unusual-lumps --symptom chronic-cough --symptom persistent-pain
//!
//! # Image match only, with a stricter threshold
//! canscan match --corpus ~/datasets/reference --image scan.png --threshold 0.9
//!
//! # Decision table only
//! canscan evaluate --image-match --symptom-count 2
//!
//! # Past assessments
//! canscan history --limit 5 --output json
//! canscan history --show 3f2b8c1e-...
//! ```

use canscan_lite::core::history::{AssessmentHistory, AssessmentRecord};
use canscan_lite::core::matcher::{
    ImageMatcher, MatchReport, MatcherConfig, DEFAULT_RESOLUTION, DEFAULT_THRESHOLD,
};
use canscan_lite::core::risk::{evaluate, RiskTier, SymptomCount};
use canscan_lite::error::{MatchError, Result};
use canscan_lite::events::{Event, EventChannel, MatchEvent};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, StyledObject, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

/// Exit status when the image or dataset was not supplied
const EXIT_MISSING_INPUT: u8 = 2;

/// CanScan Lite - image match plus symptom checklist risk assessment
#[derive(Parser, Debug)]
#[command(name = "canscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether an image matches anything in the dataset
    Match {
        #[command(flatten)]
        inputs: ScanInputs,

        #[command(flatten)]
        tuning: MatchTuning,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Run the full assessment: image match, symptoms, final verdict
    Assess {
        #[command(flatten)]
        inputs: ScanInputs,

        #[command(flatten)]
        tuning: MatchTuning,

        /// Observed symptom (repeat for each one)
        #[arg(short, long = "symptom", value_name = "SYMPTOM")]
        symptoms: Vec<Symptom>,

        /// Do not record this assessment in the history
        #[arg(long)]
        no_history: bool,

        /// History database path
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Apply the risk decision table to known inputs
    Evaluate {
        /// The image matched the dataset
        #[arg(long)]
        image_match: bool,

        /// Number of affirmed symptoms
        #[arg(long, allow_negative_numbers = true)]
        symptom_count: i64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// List the symptom checklist
    Symptoms,

    /// List, show, delete or clear past assessments
    History {
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Show one assessment in full
        #[arg(long, value_name = "ID", conflicts_with_all = ["delete", "clear"])]
        show: Option<String>,

        /// Delete one assessment
        #[arg(long, value_name = "ID", conflicts_with = "clear")]
        delete: Option<String>,

        /// Delete all recorded assessments
        #[arg(long)]
        clear: bool,

        /// History database path
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct ScanInputs {
    /// Dataset folder of reference images
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// Medical image to analyze
    #[arg(short, long)]
    image: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MatchTuning {
    /// Minimum structural similarity for a match (-1.0 to 1.0)
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Side length images are resized to before comparison
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    resolution: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// The fixed symptom checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Symptom {
    SuddenWeightLoss,
    PersistentFatigue,
    UnusualLumps,
    ChronicCough,
    SkinChanges,
    FrequentInfections,
    UnexplainedBleeding,
    PersistentPain,
    DifficultySwallowing,
    BladderChanges,
}

impl Symptom {
    fn label(&self) -> &'static str {
        match self {
            Symptom::SuddenWeightLoss => "Sudden weight loss",
            Symptom::PersistentFatigue => "Persistent fatigue",
            Symptom::UnusualLumps => "Unusual lumps",
            Symptom::ChronicCough => "Chronic cough",
            Symptom::SkinChanges => "Skin changes",
            Symptom::FrequentInfections => "Frequent infections",
            Symptom::UnexplainedBleeding => "Unexplained bleeding",
            Symptom::PersistentPain => "Persistent pain",
            Symptom::DifficultySwallowing => "Difficulty swallowing",
            Symptom::BladderChanges => "Changes in bladder habits",
        }
    }
}

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Ran to completion, whether or not the image matched
    Completed,
    /// The image or dataset was not supplied
    MissingInput,
    /// The requested history entry does not exist
    NotFound,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Completed => ExitCode::SUCCESS,
            Outcome::MissingInput => ExitCode::from(EXIT_MISSING_INPUT),
            Outcome::NotFound => ExitCode::FAILURE,
        }
    }
}

/// What `canscan history` was asked to do
enum HistoryAction {
    List { limit: usize },
    Show(String),
    Delete(String),
    Clear,
}

impl HistoryAction {
    fn from_flags(limit: usize, show: Option<String>, delete: Option<String>, clear: bool) -> Self {
        match (show, delete) {
            (Some(id), _) => HistoryAction::Show(id),
            (None, Some(id)) => HistoryAction::Delete(id),
            (None, None) if clear => HistoryAction::Clear,
            (None, None) => HistoryAction::List { limit },
        }
    }
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let term = Term::stderr();

    let result = match cli.command {
        Commands::Match {
            inputs,
            tuning,
            output,
        } => run_match(&term, &inputs, &tuning, output),
        Commands::Assess {
            inputs,
            tuning,
            symptoms,
            no_history,
            history,
            output,
        } => run_assess(&term, &inputs, &tuning, symptoms, no_history, history, output),
        Commands::Evaluate {
            image_match,
            symptom_count,
            output,
        } => run_evaluate(image_match, symptom_count, output),
        Commands::Symptoms => {
            print_symptoms();
            Ok(Outcome::Completed)
        }
        Commands::History {
            limit,
            show,
            delete,
            clear,
            history,
            output,
        } => run_history(
            &term,
            HistoryAction::from_flags(limit, show, delete, clear),
            history,
            output,
        ),
    };

    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            term.write_line(&format!(
                "{} {}",
                style("✗ Analysis failed:").red().bold(),
                e
            ))
            .ok();
            ExitCode::FAILURE
        }
    }
}

/// Both inputs, once the front end has confirmed they were supplied
struct ReadyInputs<'a> {
    corpus: &'a Path,
    image: &'a Path,
}

fn check_inputs<'a>(term: &Term, inputs: &'a ScanInputs) -> Option<ReadyInputs<'a>> {
    let corpus = inputs.corpus.as_deref().filter(|p| p.is_dir());
    let image = inputs.image.as_deref().filter(|p| p.is_file());

    match (corpus, image) {
        (Some(corpus), Some(image)) => Some(ReadyInputs { corpus, image }),
        (corpus, image) => {
            if corpus.is_none() {
                term.write_line(&format!(
                    "{} Please select a dataset folder before proceeding.",
                    style("!").yellow().bold()
                ))
                .ok();
            }
            if image.is_none() {
                term.write_line(&format!(
                    "{} Please upload an image before proceeding.",
                    style("!").yellow().bold()
                ))
                .ok();
            }
            None
        }
    }
}

fn build_matcher(tuning: &MatchTuning) -> Result<ImageMatcher> {
    let matcher = MatcherConfig::new()
        .threshold(tuning.threshold)
        .resolution(tuning.resolution)
        .build()?;
    Ok(matcher)
}

/// Scan on this thread while a listener thread drives the spinner
fn scan_with_progress(
    matcher: &ImageMatcher,
    inputs: &ReadyInputs<'_>,
    show_progress: bool,
) -> std::result::Result<MatchReport, MatchError> {
    let (sender, receiver) = EventChannel::new();

    let progress = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Analyzing image...");
        pb
    });

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        let mut seen = 0usize;
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Match(MatchEvent::CandidateCompared { path, .. })
                | Event::Match(MatchEvent::CandidateSkipped { path, .. }) => {
                    seen += 1;
                    pb.set_message(format!(
                        "Compared {} files ({})",
                        seen,
                        path.file_name().unwrap_or_default().to_string_lossy()
                    ));
                }
                Event::Match(MatchEvent::Completed(_)) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    let result = matcher.scan_with_events(inputs.image, inputs.corpus, &sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    result
}

fn run_match(
    term: &Term,
    inputs: &ScanInputs,
    tuning: &MatchTuning,
    output: OutputFormat,
) -> Result<Outcome> {
    let Some(inputs) = check_inputs(term, inputs) else {
        return Ok(Outcome::MissingInput);
    };

    let matcher = build_matcher(tuning)?;
    let report = scan_with_progress(&matcher, &inputs, matches!(output, OutputFormat::Pretty))?;

    match output {
        OutputFormat::Pretty => print_pretty_match(term, &report),
        OutputFormat::Json => println!("{:#}", match_json(&report)),
    }

    Ok(Outcome::Completed)
}

fn run_assess(
    term: &Term,
    inputs: &ScanInputs,
    tuning: &MatchTuning,
    mut symptoms: Vec<Symptom>,
    no_history: bool,
    history_path: Option<PathBuf>,
    output: OutputFormat,
) -> Result<Outcome> {
    let Some(inputs) = check_inputs(term, inputs) else {
        return Ok(Outcome::MissingInput);
    };

    symptoms.sort();
    symptoms.dedup();

    let matcher = build_matcher(tuning)?;
    let report = scan_with_progress(&matcher, &inputs, matches!(output, OutputFormat::Pretty))?;

    let symptom_count = SymptomCount::new(symptoms.len() as u32);
    let tier = evaluate(report.is_match(), symptom_count.get());

    let record = AssessmentRecord {
        id: AssessmentHistory::generate_id(),
        assessed_at: Utc::now(),
        query: inputs.image.display().to_string(),
        corpus: inputs.corpus.display().to_string(),
        image_match: report.is_match(),
        matched_candidate: report
            .matched
            .as_ref()
            .map(|m| m.path.display().to_string()),
        symptoms: symptoms.iter().map(|s| s.label().to_string()).collect(),
        symptom_count: symptom_count.get(),
        tier,
    };

    let saved = if no_history {
        false
    } else {
        let path = history_path.unwrap_or_else(AssessmentHistory::default_path);
        match AssessmentHistory::open(&path).and_then(|history| history.save(&record)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to record assessment in {}: {}", path.display(), e);
                false
            }
        }
    };

    match output {
        OutputFormat::Pretty => {
            print_pretty_match(term, &report);
            print_pretty_verdict(term, &record);
        }
        OutputFormat::Json => {
            let mut json = match_json(&report);
            json["symptoms"] = serde_json::json!(record.symptoms);
            json["symptom_count"] = serde_json::json!(record.symptom_count);
            json["tier"] = serde_json::json!(tier);
            json["verdict"] = serde_json::json!(verdict(tier));
            json["recommendations"] = serde_json::json!(recommendations(tier));
            json["history_id"] = serde_json::json!(saved.then_some(&record.id));
            println!("{:#}", json);
        }
    }

    Ok(Outcome::Completed)
}

fn run_evaluate(image_match: bool, symptom_count: i64, output: OutputFormat) -> Result<Outcome> {
    let count = SymptomCount::try_from(symptom_count)?;
    let tier = evaluate(image_match, count.get());

    match output {
        OutputFormat::Pretty => println!("{}", tier_style(tier, verdict(tier)).bold()),
        OutputFormat::Json => println!(
            "{:#}",
            serde_json::json!({
                "image_match": image_match,
                "symptom_count": count.get(),
                "tier": tier,
            })
        ),
    }

    Ok(Outcome::Completed)
}

fn run_history(
    term: &Term,
    action: HistoryAction,
    history_path: Option<PathBuf>,
    output: OutputFormat,
) -> Result<Outcome> {
    let path = history_path.unwrap_or_else(AssessmentHistory::default_path);
    let history = AssessmentHistory::open(&path)?;

    let limit = match action {
        HistoryAction::List { limit } => limit,
        HistoryAction::Clear => {
            let removed = history.clear()?;
            term.write_line(&format!("Removed {} assessments", style(removed).cyan()))
                .ok();
            return Ok(Outcome::Completed);
        }
        HistoryAction::Delete(id) => {
            if !history.delete(&id)? {
                return Ok(report_unknown_id(term, &id));
            }
            term.write_line(&format!("Removed assessment {}", style(&id).cyan()))
                .ok();
            return Ok(Outcome::Completed);
        }
        HistoryAction::Show(id) => {
            let Some(record) = history.get(&id)? else {
                return Ok(report_unknown_id(term, &id));
            };
            match output {
                OutputFormat::Json => println!("{:#}", serde_json::json!(record)),
                OutputFormat::Pretty => {
                    term.write_line(&format!(
                        "{} {}",
                        style(record.assessed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"))
                            .bold(),
                        style(&record.id).dim()
                    ))
                    .ok();
                    term.write_line(&format!("  image:   {}", record.query)).ok();
                    term.write_line(&format!("  dataset: {}", record.corpus)).ok();
                    let matched_line = match &record.matched_candidate {
                        Some(candidate) => format!(
                            "  {} {}",
                            style("Image match found in dataset:").yellow().bold(),
                            candidate
                        ),
                        None => format!("  {}", style("No image match found in dataset.").green()),
                    };
                    term.write_line(&matched_line).ok();
                    term.write_line("").ok();
                    print_pretty_verdict(term, &record);
                }
            }
            return Ok(Outcome::Completed);
        }
    };

    let page = history.list(limit, 0)?;

    match output {
        OutputFormat::Json => println!("{:#}", serde_json::json!(page)),
        OutputFormat::Pretty => {
            if page.entries.is_empty() {
                term.write_line("No assessments recorded yet.").ok();
            }
            for record in &page.entries {
                term.write_line(&format!(
                    "  {}  {}  image match: {}  symptoms: {}  {}",
                    style(record.assessed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")).dim(),
                    tier_style(record.tier, format!("{:<8}", record.tier.to_string())).bold(),
                    if record.image_match { "yes" } else { "no " },
                    record.symptom_count,
                    style(&record.id).dim()
                ))
                .ok();
            }
            if page.total_count > page.entries.len() {
                term.write_line(&format!(
                    "  {}",
                    style(format!("... {} more", page.total_count - page.entries.len())).dim()
                ))
                .ok();
            }
        }
    }

    Ok(Outcome::Completed)
}

fn report_unknown_id(term: &Term, id: &str) -> Outcome {
    term.write_line(&format!(
        "{} No assessment recorded with id {}",
        style("!").yellow().bold(),
        id
    ))
    .ok();
    Outcome::NotFound
}

fn print_symptoms() {
    for symptom in Symptom::value_variants() {
        if let Some(value) = symptom.to_possible_value() {
            println!("{:<24} {}", value.get_name(), symptom.label());
        }
    }
}

fn match_json(report: &MatchReport) -> serde_json::Value {
    serde_json::json!({
        "image_match": report.is_match(),
        "matched_candidate": report.matched.as_ref().map(|m| &m.path),
        "score": report.matched.as_ref().map(|m| m.score),
        "threshold": report.threshold,
        "compared": report.compared,
        "skipped": report.skipped,
        "duration_ms": report.duration_ms,
    })
}

fn print_pretty_match(term: &Term, report: &MatchReport) {
    term.write_line(&format!("{} Analysis complete", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} files compared, {} skipped in {:.1}s",
        style(report.compared).cyan(),
        style(report.skipped).dim(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();

    match &report.matched {
        Some(matched) => {
            term.write_line(&format!(
                "  {} {} (similarity {:.3})",
                style("Image match found in dataset:").yellow().bold(),
                display_path(&matched.path),
                matched.score
            ))
            .ok();
        }
        None => {
            term.write_line(&format!(
                "  {}",
                style("No image match found in dataset.").green()
            ))
            .ok();
        }
    }
    term.write_line("").ok();
}

fn print_pretty_verdict(term: &Term, record: &AssessmentRecord) {
    term.write_line(&format!(
        "  {} {}",
        style(record.symptom_count).cyan(),
        style("symptoms reported").dim()
    ))
    .ok();
    for symptom in &record.symptoms {
        term.write_line(&format!("    {} {}", style("•").dim(), symptom)).ok();
    }
    term.write_line("").ok();

    term.write_line(&format!("  {}", tier_style(record.tier, verdict(record.tier)).bold()))
        .ok();
    term.write_line("").ok();

    for line in recommendations(record.tier) {
        term.write_line(&format!("    {} {}", style("→").dim(), line)).ok();
    }
    term.write_line("").ok();

    term.write_line(&format!(
        "{}",
        style("This tool does not provide a diagnosis. Consult a medical professional.").dim()
    ))
    .ok();
}

fn verdict(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => "High Risk: Consult a doctor immediately.",
        RiskTier::Moderate => "Moderate Risk: Further tests recommended.",
        RiskTier::Low => "Low Risk: You're likely safe.",
    }
}

fn recommendations(tier: RiskTier) -> &'static [&'static str] {
    match tier {
        RiskTier::High => &[
            "Schedule an appointment with an oncologist within 48 hours",
            "Bring all medical records and this scan result",
            "Consider getting a second opinion",
            "Avoid self-medication until professional consultation",
        ],
        RiskTier::Moderate => &[
            "Schedule a consultation with your primary care physician",
            "Request additional diagnostic tests",
            "Monitor symptoms closely",
            "Maintain a symptom diary",
        ],
        RiskTier::Low => &[
            "Continue regular health check-ups",
            "Maintain a healthy lifestyle",
            "Monitor for any new symptoms",
            "Schedule routine screening as recommended",
        ],
    }
}

fn tier_style<D>(tier: RiskTier, value: D) -> StyledObject<D> {
    match tier {
        RiskTier::High => style(value).red(),
        RiskTier::Moderate => style(value).yellow(),
        RiskTier::Low => style(value).green(),
    }
}

fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(|rest| format!("~/{}", rest.display())))
        .unwrap_or_else(|| path.display().to_string())
}
