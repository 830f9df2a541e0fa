use crate::core::{
    references, CategoryFilter, EditorSession, FieldRegistry, FunctionCatalog, Validation,
    Validator,
};
use crate::error::{CalcFieldError, CalcFieldResult, SaveError};
use crate::parser;
use crate::types::ReportDefinition;
use colored::Colorize;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Result of checking one calculated field from a report definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub alias: String,
    pub formula: String,
    pub outcome: Result<(), SaveError>,
}

/// Run every calculated field of a report through an editor session,
/// exactly as the builder UI would before saving
pub fn check_report(report: &ReportDefinition, catalog: &FunctionCatalog) -> Vec<FieldCheck> {
    let registry = FieldRegistry::new(report.fields.clone());

    report
        .calculated_fields
        .iter()
        .map(|def| {
            let mut session = EditorSession::new(&registry, catalog);
            session.set_alias(def.alias.clone());
            session.set_formula(def.formula.clone());
            FieldCheck {
                alias: def.alias.clone(),
                formula: def.formula.clone(),
                outcome: session.build().map(|_| ()),
            }
        })
        .collect()
}

/// Execute the validate command for a single formula
pub fn validate(formula: String, fields: Option<PathBuf>) -> CalcFieldResult<()> {
    println!("{}", "✅ Validating formula".bold().green());
    println!("   Formula: {}", formula.yellow());

    let report = match &fields {
        Some(path) => {
            println!("   Fields: {}", path.display());
            parser::parse_report(path)?
        }
        None => ReportDefinition::default(),
    };
    println!();

    let registry = FieldRegistry::new(report.fields);
    let validator = Validator::new(&registry, FunctionCatalog::standard());

    match validator.validate(&formula) {
        Validation::Valid => {
            let refs = references(&formula);
            println!("{}", "✅ Formula is valid".bold().green());
            if !refs.fields.is_empty() {
                println!("   Fields: {}", refs.fields.join(", ").cyan());
            }
            if !refs.functions.is_empty() {
                println!("   Functions: {}", refs.functions.join(", ").cyan());
            }
            Ok(())
        }
        Validation::Empty => {
            println!("{}", "⚠️  Formula is empty".yellow());
            Err(CalcFieldError::Validation("Formula is required".to_string()))
        }
        Validation::Invalid(e) => {
            println!("{} {}", "❌".red(), e.to_string().red().bold());
            Err(CalcFieldError::Validation(e.to_string()))
        }
    }
}

/// Execute the check command over one or more report definitions
///
/// A file that cannot be read or parsed is reported and skipped; the
/// remaining files are still checked.
pub fn check(files: Vec<PathBuf>) -> CalcFieldResult<()> {
    let mut failed = 0usize;
    let mut unreadable = 0usize;

    for file in &files {
        match check_file(file) {
            Ok(n) => failed += n,
            Err(e) => {
                unreadable += 1;
                tracing::warn!(path = %file.display(), error = %e, "report definition skipped");
                println!("   {} {}\n", "❌".red(), e.to_string().red());
            }
        }
    }

    if failed > 0 || unreadable > 0 {
        return Err(CalcFieldError::Validation(format!(
            "{} calculated field(s) failed validation, {} file(s) could not be checked",
            failed, unreadable
        )));
    }

    println!("{}", "✅ All calculated fields are valid".bold().green());
    Ok(())
}

/// Check one file and print the results; returns the number of failures
fn check_file(file: &Path) -> CalcFieldResult<usize> {
    println!("{}", "🔍 Checking report".bold().green());
    println!("   File: {}", file.display());

    let report = parser::parse_report(file)?;
    if let Some(source) = &report.data_source {
        println!("   Data source: {}", source.bright_blue().bold());
    }
    println!(
        "   {} fields, {} calculated fields\n",
        report.fields.len(),
        report.calculated_fields.len()
    );

    if report.calculated_fields.is_empty() {
        println!("{}", "⚠️  No calculated fields found".yellow());
        println!();
        return Ok(0);
    }

    let results = check_report(&report, FunctionCatalog::standard());
    let mut failed = 0;

    for result in &results {
        let label = if result.alias.trim().is_empty() {
            "(no alias)".to_string()
        } else {
            result.alias.clone()
        };

        match &result.outcome {
            Ok(()) => {
                println!("   {} {} = {}", "✓".green(), label.bright_blue(), result.formula);
                let refs = references(&result.formula);
                if !refs.fields.is_empty() {
                    println!("      fields: {}", refs.fields.join(", ").cyan());
                }
                if !refs.functions.is_empty() {
                    println!("      functions: {}", refs.functions.join(", ").cyan());
                }
            }
            Err(e) => {
                failed += 1;
                println!("   {} {} = {}", "✗".red(), label.bright_blue(), result.formula);
                println!("      {}", e.to_string().red());
            }
        }
    }
    println!();

    Ok(failed)
}

/// Execute the functions command
pub fn functions(category: Option<String>) -> CalcFieldResult<()> {
    let filter = match category {
        Some(c) => c
            .parse::<CategoryFilter>()
            .map_err(|e| CalcFieldError::Parse(e.to_string()))?,
        None => CategoryFilter::All,
    };

    println!("{}", "📚 Formula functions".bold().green());
    println!();

    let catalog = FunctionCatalog::standard();
    let mut current = None;
    for func in catalog.list_by_category(filter) {
        if current != Some(func.category) {
            println!("   {}", func.category.to_string().to_uppercase().bold().cyan());
            current = Some(func.category);
        }
        println!(
            "      {:<32} {}",
            func.template().bright_blue(),
            func.description
        );
    }
    println!();

    Ok(())
}

/// Execute the watch command - re-check a report definition on every save
pub fn watch(file: PathBuf, verbose: bool) -> CalcFieldResult<()> {
    println!("{}", "👁️  calcfield - Watch Mode".bold().green());
    println!("   Watching: {}", file.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !file.exists() {
        return Err(CalcFieldError::Validation(format!(
            "File not found: {}",
            file.display()
        )));
    }

    let canonical_path = file.canonicalize()?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| CalcFieldError::Watch("Cannot determine parent directory".to_string()))?;

    let (tx, rx) = channel();

    // Debounce so a single save triggers a single check
    let mut debouncer = new_debouncer(Duration::from_millis(200), tx)
        .map_err(|e| CalcFieldError::Watch(format!("Failed to create file watcher: {}", e)))?;

    debouncer
        .watcher()
        .watch(parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| CalcFieldError::Watch(format!("Failed to watch directory: {}", e)))?;

    if verbose {
        println!(
            "   {} {}",
            "Watching directory:".cyan(),
            parent_dir.display()
        );
    }

    println!("{}", "🔄 Initial run...".cyan());
    run_watch_check(&file);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && event.path.file_name() == canonical_path.file_name()
                });

                if relevant {
                    tracing::info!(path = %file.display(), "report definition changed");
                    println!("{}", "🔄 Change detected, re-checking...".cyan());
                    run_watch_check(&file);
                }
            }
            Ok(Err(e)) => {
                println!("{}", format!("⚠️  Watch error: {:?}", e).yellow());
            }
            Err(e) => {
                return Err(CalcFieldError::Watch(format!("Watch channel closed: {}", e)));
            }
        }
    }
}

/// Errors are printed, not returned, so watching continues after a bad edit
fn run_watch_check(file: &Path) {
    match check_file(file) {
        Ok(0) => println!("{}", "✅ All calculated fields are valid\n".green()),
        Ok(n) => println!(
            "{}",
            format!("❌ {} calculated field(s) failed validation\n", n).red()
        ),
        Err(e) => println!("{}", format!("❌ {}\n", e).red()),
    }
}
