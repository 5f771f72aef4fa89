use crate::infra::directory_service;
use arc_directory::directory::{
    CriteriaCatalog, CriterionCategory, CriterionSelections, ProviderImporter, ProviderListing,
    ScoreBreakdown, ScoringEngine,
};
use arc_directory::error::AppError;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Legacy ARC criterion key (e.g. legacy_arc_full_support)
    #[arg(long)]
    pub(crate) legacy_arc: String,
    /// New ARC criterion key (e.g. new_arc_separate_support)
    #[arg(long)]
    pub(crate) new_arc: String,
    /// Service availability criterion key (e.g. service_partial)
    #[arg(long)]
    pub(crate) service: String,
    /// Registration criterion key (e.g. registration_offline)
    #[arg(long)]
    pub(crate) registration: String,
    /// Print the points contributed by each criterion
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Provider CSV export to load
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Include providers hidden from the public listing
    #[arg(long)]
    pub(crate) include_inactive: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        legacy_arc,
        new_arc,
        service,
        registration,
        breakdown,
    } = args;

    let selections = CriterionSelections::new(legacy_arc, new_arc, service, registration);
    let result = ScoringEngine::default()
        .breakdown(&selections)
        .map_err(|err| AppError::Directory(err.into()))?;

    print!("{}", render_score(&result, breakdown));
    Ok(())
}

pub(crate) fn run_criteria() {
    print!("{}", render_criteria(CriteriaCatalog::standard()));
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let service = directory_service();
    let summary = ProviderImporter::from_path(&args.csv, &service)?;
    let listings = service.listings(args.include_inactive)?;

    println!(
        "Imported {} providers across {} new categories from {}",
        summary.providers_imported,
        summary.categories_created,
        args.csv.display()
    );
    print!("{}", render_listings(&listings));
    Ok(())
}

fn render_score(result: &ScoreBreakdown, with_breakdown: bool) -> String {
    let mut out = format!("Score: {} ({})\n", result.total, result.grade());
    if with_breakdown {
        out.push_str(&format!("  Base score: {}\n", result.base_score));
        for component in &result.components {
            out.push_str(&format!(
                "  {:<22} {:>4}  {}\n",
                component.category.title(),
                component.points,
                component.description
            ));
        }
    }
    out
}

fn render_criteria(catalog: &CriteriaCatalog) -> String {
    let mut out = String::new();
    for category in CriterionCategory::ALL {
        out.push_str(&format!("{}\n  {}\n", category.title(), category.help_text()));
        for definition in catalog.for_category(category) {
            out.push_str(&format!(
                "  {:<28} {:>4}  {}\n",
                definition.key.as_str(),
                definition.points,
                definition.short_description
            ));
        }
    }
    out
}

fn render_listings(listings: &[ProviderListing]) -> String {
    if listings.is_empty() {
        return "No providers to show\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:>5}  {:<28} {:<20} {}\n",
        "Grade", "Score", "Provider", "Category", "URL"
    );
    for listing in listings {
        let marker = if listing.active { "" } else { " (inactive)" };
        out.push_str(&format!(
            "{:<6} {:>5}  {:<28} {:<20} {}{}\n",
            listing.grade.label(),
            listing.score,
            listing.name,
            listing.category,
            listing.url,
            marker
        ));
    }
    out
}
