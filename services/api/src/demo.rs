use crate::infra::{load_inventory, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use housing_allocation::allocation::{
    AllocationEngine, AllocationRecord, InventorySummary, MatchCandidate, MatchFactor, Priority,
    RequestSubmission,
};
use housing_allocation::config::AppConfig;
use housing_allocation::error::AppError;
use std::path::PathBuf;

/// Best candidates scoring below this are not confirmed during the demo.
const DEMO_MIN_SCORE: u8 = 60;
const DEMO_SHORTLIST: usize = 3;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Listing export (CSV) to load instead of the built-in program estates
    #[arg(long)]
    pub(crate) listings: Option<PathBuf>,
    /// Request and allocation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Requested property type (apartment, duplex, bungalow, terrace, mansion)
    #[arg(long)]
    pub(crate) property_type: String,
    /// Customer budget for one unit
    #[arg(long)]
    pub(crate) budget: i64,
    /// Preferred location
    #[arg(long)]
    pub(crate) location: String,
    /// Number of candidates to print (defaults to ALLOCATION_MATCH_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Listing export (CSV) to load instead of the built-in program estates
    #[arg(long)]
    pub(crate) listings: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let engine = AllocationEngine::new(load_inventory(args.listings.as_deref())?);

    println!("Housing allocation demo ({today})");
    render_summary("Inventory before allocation", &engine.inventory_summary());

    for submission in demo_submissions(today) {
        let request = engine.submit_request(submission)?;
        println!(
            "Submitted {} for {}: {} in {} up to {} ({} priority)",
            request.id,
            request.customer_id,
            request.requested_property_type,
            request.location,
            request.budget,
            request.priority.label()
        );
    }

    println!("\nPending queue");
    let queue = engine.list_pending_requests();
    for request in &queue {
        println!(
            "- {} [{}] {} {}",
            request.id,
            request.priority.label(),
            request.requested_property_type,
            request.location
        );
    }

    for request in queue {
        println!("\nMatching {}", request.id);
        let candidates = engine.find_matches(&request.id)?;
        for candidate in candidates.iter().take(DEMO_SHORTLIST) {
            render_candidate(candidate);
        }

        match candidates.first() {
            Some(best) if best.score >= DEMO_MIN_SCORE => {
                engine.begin_progress(&request.id)?;
                let record = engine.confirm_allocation_on(&request.id, &best.listing.id, today)?;
                render_record(&record);
            }
            Some(best) => {
                engine.cancel(&request.id)?;
                println!(
                    "  Cancelled: best candidate {} scored {} (below {})",
                    best.listing.id, best.score, DEMO_MIN_SCORE
                );
            }
            None => {
                engine.cancel(&request.id)?;
                println!("  Cancelled: no listing has available units");
            }
        }
    }

    let history = engine.list_allocation_history(None);
    println!("\nAllocation history ({} records)", history.len());
    for record in &history {
        println!(
            "- {} {} -> {} ({})",
            record.id, record.customer_id, record.unit_id, record.allocation_date
        );
    }

    render_summary("\nInventory after allocation", &engine.inventory_summary());
    Ok(())
}

pub(crate) fn run_match(args: MatchArgs, config: &AppConfig) -> Result<(), AppError> {
    let engine = AllocationEngine::new(load_inventory(args.listings.as_deref())?);
    let request = engine.submit_request(RequestSubmission {
        customer_id: "CLI".to_string(),
        requested_property_type: args.property_type,
        budget: args.budget,
        location: args.location,
        priority: Priority::default(),
        request_date: None,
    })?;

    let candidates = engine.find_matches(&request.id)?;
    let limit = args.limit.unwrap_or(config.allocation.match_limit);
    println!(
        "{} candidates for {} in {} up to {}",
        candidates.len(),
        request.requested_property_type,
        request.location,
        request.budget
    );
    for candidate in candidates.iter().take(limit) {
        render_candidate(candidate);
    }
    Ok(())
}

fn demo_submissions(today: NaiveDate) -> Vec<RequestSubmission> {
    let submission = |customer: &str, kind: &str, budget: i64, location: &str, priority| {
        RequestSubmission {
            customer_id: customer.to_string(),
            requested_property_type: kind.to_string(),
            budget,
            location: location.to_string(),
            priority,
            request_date: Some(today),
        }
    };

    vec![
        submission("CUS-0001", "apartment", 45_000_000, "Lagos", Priority::High),
        submission("CUS-0002", "duplex", 90_000_000, "Abuja", Priority::Medium),
        submission("CUS-0003", "terrace", 30_000_000, "Port Harcourt", Priority::Low),
        submission("CUS-0004", "bungalow", 20_000_000, "Enugu", Priority::Medium),
    ]
}

fn render_candidate(candidate: &MatchCandidate) {
    let factor = |factor: MatchFactor| {
        candidate
            .components
            .iter()
            .find(|component| component.factor == factor)
            .map_or(0.0, |component| component.score)
    };
    println!(
        "  {:>3}  {} {} ({}, {} available) type {:.0} budget {:.0} location {:.0}",
        candidate.score,
        candidate.listing.id,
        candidate.listing.name,
        candidate.listing.location,
        candidate.listing.available_units,
        factor(MatchFactor::PropertyType),
        factor(MatchFactor::Budget),
        factor(MatchFactor::Location),
    );
}

fn render_record(record: &AllocationRecord) {
    println!(
        "  Allocated {} to {} as {} (value {})",
        record.property_id, record.customer_id, record.unit_id, record.value
    );
}

fn render_summary(title: &str, summary: &InventorySummary) {
    println!("{title}");
    println!(
        "  {} listings, {} units: {} available, {} allocated, {} under construction",
        summary.listings,
        summary.total_units,
        summary.available_units,
        summary.allocated_units,
        summary.under_construction_units
    );
    println!("  Allocated value: {}", summary.allocated_value);
}
