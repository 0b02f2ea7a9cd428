use chrono::{DateTime, Local, Utc};
use parser_console::api::schema::search::Suggestion;
use parser_console::api::schema::seller::SellerRecord;
use parser_console::jobs::JobPhase;

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn phase(phase: &JobPhase) {
    match phase {
        JobPhase::NotStarted => {}
        JobPhase::Submitted { job_id } => eprintln!("Job {} submitted", job_id),
        JobPhase::Polling { job_id, attempts } => {
            eprintln!("Job {} running, check {}", job_id, attempts)
        }
        JobPhase::Finished { job_id } => eprintln!("Job {} finished, fetching result", job_id),
        JobPhase::ResultFetched { job_id, count } => {
            eprintln!("Job {}: {} sellers", job_id, count)
        }
        JobPhase::Failed { message, .. } => eprintln!("Job failed: {}", message),
        JobPhase::Cancelled { .. } => eprintln!("Job cancelled"),
    }
}

pub fn sellers(rows: &[SellerRecord]) {
    if rows.is_empty() {
        println!("No sellers found");
        return;
    }

    println!(
        "{:<10} {:<32} {:<13} {:>8} {:<10} {:<20} {}",
        "SELLER", "NAME", "INN", "SALES", "REGISTERED", "PHONE", "EMAIL"
    );
    for row in rows {
        println!(
            "{:<10} {:<32} {:<13} {:>8} {:<10} {:<20} {}",
            row.seller_id.map(|id| id.to_string()).unwrap_or_default(),
            clip(row.display_name(), 32),
            row.inn.as_deref().unwrap_or(""),
            row.sales(),
            row.registered_at()
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            clip(&row.phone.join(", "), 20),
            row.email.join(", "),
        );
    }
    println!("{} sellers", rows.len());
}

pub fn suggestions(found: &[Suggestion]) {
    if found.is_empty() {
        println!("  (no suggestions)");
    }
    for suggestion in found {
        println!("  {:<8} {}", suggestion.id, suggestion.store_name);
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}
