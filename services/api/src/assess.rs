use crate::infra::{bin_schemes, parse_bin_edges, AssessmentOverrides, BinEdges};
use clap::Args;
use mepca::config::AppConfig;
use mepca::error::AppError;
use mepca::telemetry;
use mepca::workflows::mepca::{AssessmentBatch, AssessmentSummary, MepcaPipeline, PASS_THRESHOLD};
use mepca::workflows::ospar::{OsparExporter, OsparReturnImporter};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// CSV export of the MPA_MGT sheet, or a directory of them
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Directory to write the QC, score, count, final score and distribution tables to
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Reject records with unrecognized answers instead of flagging them
    #[arg(long)]
    pub(crate) strict: bool,
    /// Keep raw scores on the final scale even when confidence scores zero
    #[arg(long)]
    pub(crate) no_zero_confidence_exclusion: bool,
    /// Comma separated edges for the raw score distribution
    #[arg(long, value_parser = parse_bin_edges)]
    pub(crate) raw_bins: Option<BinEdges>,
    /// Comma separated edges for the final score distribution
    #[arg(long, value_parser = parse_bin_edges)]
    pub(crate) final_bins: Option<BinEdges>,
    /// Print every computed indicator
    #[arg(long)]
    pub(crate) list_records: bool,
}

impl AssessArgs {
    fn overrides(&self) -> AssessmentOverrides {
        AssessmentOverrides {
            strict: self.strict.then_some(true),
            zero_confidence_exclusion: self.no_zero_confidence_exclusion.then_some(false),
        }
    }
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let pipeline_config = args.overrides().apply(config.assessment);
    let (raw_bins, final_bins) = bin_schemes(
        args.raw_bins.map(|edges| edges.0),
        args.final_bins.map(|edges| edges.0),
    )?;

    let records = OsparReturnImporter::load(&args.input)?;
    let batch = MepcaPipeline::new(pipeline_config).run(&records);
    let summary = batch.summarize(&raw_bins, &final_bins);

    render_assessment(&batch, &summary, &args.input, args.list_records);

    if let Some(dir) = args.output {
        let written = OsparExporter::new(dir).export(&batch, &summary)?;
        println!("\nOutputs");
        for path in written {
            println!("- {}", path.display());
        }
    }

    Ok(())
}

fn render_assessment(
    batch: &AssessmentBatch,
    summary: &AssessmentSummary,
    input: &Path,
    list_records: bool,
) {
    println!("MEPCA assessment");
    println!(
        "Input: {} (assessed {})",
        input.display(),
        batch.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "Mode: {} | zero confidence exclusion {}",
        if batch.config.strict { "strict" } else { "lenient" },
        if batch.config.indicator.zero_confidence_exclusion {
            "on"
        } else {
            "off"
        }
    );

    let totals = &summary.totals;
    println!(
        "\nRecords: {} read | {} normalized | {} scored | {} indicators",
        totals.records, totals.normalized, totals.scored, totals.indicators
    );
    println!(
        "Diagnostics: {} flagged | {} rejected",
        totals.flagged, totals.rejected
    );

    let pass = &summary.pass;
    println!(
        "\nPass threshold {PASS_THRESHOLD}: {} passed, {} failed ({:.0}% pass rate)",
        pass.passed,
        pass.failed,
        pass.pass_rate * 100.0
    );

    for (title, report) in [
        ("Raw score distribution", &summary.raw_score_buckets),
        ("Final score distribution", &summary.final_score_buckets),
    ] {
        println!("\n{title}");
        for (label, count) in report.entries() {
            println!("- {label}: {count}");
        }
        if report.out_of_range > 0 {
            println!("- out of range: {}", report.out_of_range);
        }
    }

    println!("\nAnswers by question");
    for distribution in &summary.answer_distributions {
        let counts: Vec<String> = distribution
            .entries
            .iter()
            .map(|entry| format!("{} {}", entry.label, entry.count))
            .collect();
        println!("- {}: {}", distribution.field_label, counts.join(", "));
    }

    if batch.diagnostics.is_empty() {
        println!("\nDiagnostics: none");
    } else {
        println!("\nDiagnostics");
        for diagnostic in &batch.diagnostics {
            println!(
                "- [{:?}/{:?}] {} ({}): {}",
                diagnostic.stage,
                diagnostic.disposition,
                diagnostic.mpa_id,
                diagnostic.country,
                diagnostic.message
            );
        }
    }

    if list_records {
        println!("\nIndicators");
        for record in &batch.indicators {
            println!(
                "- {} | {} | raw {:.2} | final {:.2} | {}",
                record.mpa_id,
                record.country,
                record.raw_score,
                record.final_score,
                if record.pass_flag { "pass" } else { "fail" }
            );
        }
    }
}
