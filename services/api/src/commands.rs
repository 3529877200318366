use crate::infra::{parse_date, parse_source, Services};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use econ_mood::config::AppConfig;
use econ_mood::data::{DataSourceKind, DataStatusReport};
use econ_mood::error::AppError;
use econ_mood::feedback::SubmissionResult;
use econ_mood::metadata::{MetadataCatalog, SchemaLoader, SchemaSource, SchemaValidation};
use econ_mood::questions;
use econ_mood::scoring::{Demographics, ScoreReport};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Question id (see `questions`)
    pub(crate) question_id: String,
    /// Evaluation date (YYYY-MM-DD). Defaults to the latest observation in the dataset.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Force the mock or real dataset for this run
    #[arg(long, value_parser = parse_source)]
    pub(crate) data_source: Option<DataSourceKind>,
    /// Print the full score as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[arg(long)]
    pub(crate) age_group: Option<String>,
    #[arg(long)]
    pub(crate) household_income: Option<String>,
    #[arg(long)]
    pub(crate) geography: Option<String>,
    #[arg(long)]
    pub(crate) household_size: Option<u8>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoresArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to the latest observation in the dataset.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    #[arg(long, value_parser = parse_source)]
    pub(crate) data_source: Option<DataSourceKind>,
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum DataCommand {
    /// Show which dataset serves requests and whether every catalog series is present
    Status {
        #[arg(long, value_parser = parse_source)]
        data_source: Option<DataSourceKind>,
    },
    /// Drop cached data and load it again
    Reload {
        #[arg(long, value_parser = parse_source)]
        data_source: Option<DataSourceKind>,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum SchemaCommand {
    /// Check the schema document for structural problems
    Validate {
        /// Schema file to check (defaults to the configured schema)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// List every described indicator, grouped by category
    Show,
}

#[derive(Args, Debug)]
pub(crate) struct SubscribeArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, default_value = "Command Line")]
    pub(crate) source: String,
    /// Digest frequency (defaults to weekly)
    #[arg(long)]
    pub(crate) frequency: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ContactArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) message: String,
    /// Feedback category (defaults to general)
    #[arg(long)]
    pub(crate) feedback_type: Option<String>,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        question_id,
        as_of,
        data_source,
        json,
        age_group,
        household_income,
        geography,
        household_size,
    } = args;

    let demographics = Demographics {
        age_group,
        household_income,
        geography,
        household_size,
    };
    let services = Services::from_config(&AppConfig::load()?)?;
    let report = services
        .mood
        .score_question(&question_id, as_of, data_source, Some(demographics))
        .await?;

    if json {
        print_json(&report);
    } else {
        render_score(&report, true);
    }
    Ok(())
}

pub(crate) async fn run_scores(args: ScoresArgs) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let reports = services
        .mood
        .score_all(args.as_of, args.data_source)
        .await?;

    if args.json {
        print_json(&reports);
        return Ok(());
    }

    if let Some(first) = reports.first() {
        println!(
            "Economic mood as of {} ({} data)",
            first.result.as_of,
            source_label(first)
        );
    }
    for report in &reports {
        println!();
        render_score(report, false);
    }
    Ok(())
}

pub(crate) fn run_questions() -> Result<(), AppError> {
    println!("Mood questions");
    for question in questions::catalog() {
        println!("- {} ({}): {}", question.id, question.title, question.question);
        println!("    series: {}", question.series.join(", "));
    }
    Ok(())
}

pub(crate) async fn run_data(command: DataCommand) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let today = Local::now().date_naive();

    let report = match command {
        DataCommand::Status { data_source } => {
            services.mood.data_status(data_source, false, today).await?
        }
        DataCommand::Reload { data_source } => {
            let report = services.mood.data_status(data_source, true, today).await?;
            println!("Indicator data reloaded");
            report
        }
    };

    for line in data_status_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) async fn run_schema(command: SchemaCommand) -> Result<(), AppError> {
    match command {
        SchemaCommand::Validate { path } => {
            let source = match path {
                Some(path) => SchemaSource::Path(path),
                None => SchemaSource::from_config(AppConfig::load()?.data.schema_path),
            };
            let loader = SchemaLoader::new(source);
            let validation = loader.validate().await?;
            render_schema_validation(loader.source(), &validation);

            if validation.is_valid() {
                Ok(())
            } else {
                Err(AppError::invalid_input(format!(
                    "schema has {} error(s)",
                    validation.errors.len()
                )))
            }
        }
        SchemaCommand::Show => {
            let source = SchemaSource::from_config(AppConfig::load()?.data.schema_path);
            let loader = SchemaLoader::new(source);
            let catalog = loader.catalog().await;
            println!("Schema: {} ({} indicators)", loader.source(), catalog.len());
            for line in catalog_lines(&catalog) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

pub(crate) async fn run_subscribe(args: SubscribeArgs) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let result = services
        .feedback
        .submit_subscription(&args.email, &args.source, args.frequency.as_deref())
        .await;
    finish_submission(result)
}

pub(crate) async fn run_contact(args: ContactArgs) -> Result<(), AppError> {
    let services = Services::from_config(&AppConfig::load()?)?;
    let result = services
        .feedback
        .submit_contact(
            &args.name,
            &args.email,
            &args.message,
            args.feedback_type.as_deref(),
        )
        .await;
    finish_submission(result)
}

fn finish_submission(result: SubmissionResult) -> Result<(), AppError> {
    if result.success {
        println!("{}", result.message);
        return Ok(());
    }
    let code = result
        .error
        .map(|code| format!("{code:?}"))
        .unwrap_or_else(|| "Unknown".to_string());
    Err(AppError::Submission(format!("{} ({})", result.message, code)))
}

fn render_score(report: &ScoreReport, detailed: bool) {
    let result = &report.result;
    let title = questions::find(&result.question_id)
        .map(|question| question.question)
        .unwrap_or(result.question_id.as_str());

    println!("{} {}", result.emoji, title);
    println!(
        "  Mood: {} (score {:+.2}; {} good / {} neutral / {} bad)",
        result.mood.label(),
        result.score,
        result.good_count,
        result.neutral_count,
        result.bad_count
    );
    println!("  {}", result.insight);
    if !detailed {
        return;
    }

    println!("  As of {} ({} data)", result.as_of, source_label(report));
    println!("  Indicators");
    for indicator in &result.indicators {
        if indicator.has_data() {
            println!(
                "  - {} [{}]: {} {} on {} (was {}) -> {}",
                indicator.name,
                indicator.code,
                format_value(indicator.value),
                indicator.display_units,
                indicator.timestamp,
                indicator
                    .comparison_value
                    .map(format_value)
                    .unwrap_or_else(|| "n/a".to_string()),
                indicator.mood
            );
        } else {
            println!("  - {} [{}]: {}", indicator.name, indicator.code, indicator.timestamp);
        }
        println!("      {}", indicator.message);
    }
}

fn data_status_lines(report: &DataStatusReport) -> Vec<String> {
    let mut lines = vec![
        format!("Location: {}", report.location),
        format!(
            "Requested: {} / served: {}{}",
            report.requested_source,
            report.served_source,
            if report.fell_back {
                " (fell back to bundled data)"
            } else {
                ""
            }
        ),
        format!(
            "Records: {} across {} series",
            report.record_count,
            report.series.len()
        ),
    ];
    if let Some(range) = report.date_range {
        lines.push(format!("Date range: {} to {}", range.start, range.end));
    }

    let validation = &report.validation;
    if validation.valid {
        lines.push(format!(
            "Catalog coverage: all {} series present",
            validation.available.len()
        ));
    } else {
        lines.push(format!(
            "Catalog coverage: {} missing ({})",
            validation.missing.len(),
            validation.missing.join(", ")
        ));
    }
    if !report.extra_series.is_empty() {
        lines.push(format!(
            "Not in schema: {}",
            report.extra_series.join(", ")
        ));
    }

    lines.push(String::new());
    lines.push("Series (most recent first)".to_string());
    for status in &report.series {
        lines.push(format!(
            "- [{}] {} ({}): {} points, latest {} on {} ({} days ago)",
            status.freshness.label(),
            status.code,
            status.name,
            status.count,
            format_value(status.latest_value),
            status.latest_date,
            status.age_days
        ));
    }
    lines
}

fn catalog_lines(catalog: &MetadataCatalog) -> Vec<String> {
    let mut categories: Vec<&str> = Vec::new();
    for meta in catalog.iter() {
        if !categories.contains(&meta.category.as_str()) {
            categories.push(meta.category.as_str());
        }
    }

    let mut lines = Vec::new();
    for category in categories {
        lines.push(String::new());
        lines.push(category.to_string());
        for meta in catalog.iter().filter(|meta| meta.category == category) {
            lines.push(format!(
                "- {} ({}, {}): {}",
                meta.code,
                meta.name,
                meta.update_frequency,
                catalog.description(&meta.code)
            ));
        }
    }
    lines
}

fn render_schema_validation(source: &SchemaSource, validation: &SchemaValidation) {
    println!("Schema: {}", source);
    println!(
        "Metrics: {} ({} unique ids)",
        validation.metric_count, validation.unique_ids
    );
    let categories: Vec<&str> = validation.categories.iter().map(String::as_str).collect();
    println!("Categories: {}", categories.join(", "));

    if validation.errors.is_empty() {
        println!("Errors: none");
    } else {
        println!("Errors");
        for error in &validation.errors {
            println!("- {}", error);
        }
    }
    if !validation.warnings.is_empty() {
        println!("Warnings");
        for warning in &validation.warnings {
            println!("- {}", warning);
        }
    }
}

fn source_label(report: &ScoreReport) -> String {
    if report.fell_back {
        format!("{}, requested {}", report.served_source, report.requested_source)
    } else {
        report.served_source.to_string()
    }
}

fn format_value(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("JSON output unavailable: {}", err),
    }
}
