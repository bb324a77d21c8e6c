use anyhow::{bail, Result};
use saveage::{
    cache::QueryCache,
    client::ApiClient,
    grid::{
        columns::SAVE_AGE_COLUMNS,
        datasource::{RangeCallbacks, SaveAgeDatasource, ViewportParams},
    },
    model::SaveAgeRow,
    params::{QueryAddress, ReportSelection},
    stats,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const PAGE_SIZE: u64 = 100;

/// Prints pages as the datasource serves them, remembering the total so the
/// pager knows when to stop.
struct ConsoleRange {
    total: Option<u64>,
    failed: bool,
}

impl RangeCallbacks for ConsoleRange {
    fn success(&mut self, rows: Vec<SaveAgeRow>, total_count: u64) {
        self.total = Some(total_count);
        for row in rows {
            let row = match serde_json::to_value(&row) {
                Ok(v) => v,
                Err(err) => {
                    warn!(error = %err, "row serialization failed");
                    continue;
                }
            };
            let cells: Vec<String> = SAVE_AGE_COLUMNS.iter().map(|c| c.render(&row)).collect();
            println!("{}", cells.join(" | "));
        }
    }

    fn fail(&mut self) {
        self.failed = true;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) parse the shared report address ──────────────────────────
    let Some(query) = std::env::args().nth(1) else {
        bail!("usage: saveage \"cid=<census_id>&rid=<rate_id>&ed=YYYY-MM-DD\"");
    };
    let address = QueryAddress::parse(&query);
    let selection = ReportSelection::from_address(&address);
    info!(?selection, "report selection");

    let client = ApiClient::from_env();

    // ─── 3) census & rate context ────────────────────────────────────
    if let Some(cid) = selection.census_master_id {
        let master = client.census_master(cid).await?;
        println!("Census: {} (#{})", master.census_name, master.census_master_id);

        let census_stats = client.census_stats(cid).await?;
        let tobacco = stats::tobacco_percentages(&census_stats.tobacco_stats);
        if let Some(non_tobacco) = tobacco.get("N") {
            println!("% Non Tobacco Users: {:.0}%", non_tobacco * 100.0);
        }
        let tenure = stats::tenure_summary(&census_stats.tenure_stats);
        println!("Average Tenure: {:.0} Yrs (max {})", tenure.avg, tenure.max);
        if let Some(avg_age) = stats::average_issue_age(&census_stats.issue_age_stats) {
            println!("Average Issue Age: {avg_age:.1}");
        }
    }
    if let Some(rid) = selection.rate_master_id {
        let rates = client.rate_master(rid).await?;
        println!("Rate set: {} (#{})", rates.rate_master_name, rates.rate_master_id);
    }

    // ─── 4) page the save-age report through the datasource ──────────
    let datasource = SaveAgeDatasource::new(client, QueryCache::default(), selection);
    println!();
    println!(
        "{}",
        SAVE_AGE_COLUMNS
            .iter()
            .map(|c| c.header)
            .collect::<Vec<_>>()
            .join(" | ")
    );

    let mut start = 0u64;
    loop {
        let viewport = ViewportParams {
            start_row: start,
            end_row: start + PAGE_SIZE,
            ..Default::default()
        };
        let mut cb = ConsoleRange {
            total: None,
            failed: false,
        };
        datasource.get_rows(&viewport, &mut cb).await;
        if cb.failed {
            println!("(no report: select a census, rate set, and effective date)");
            break;
        }
        let total = cb.total.unwrap_or(0);
        start += PAGE_SIZE;
        if start >= total {
            info!(total, "report complete");
            break;
        }
    }

    // ─── 5) impacted summary from the first page's stats ─────────────
    let first_viewport = ViewportParams {
        start_row: 0,
        end_row: PAGE_SIZE,
        ..Default::default()
    };
    if let Some(page) = datasource.cached_page(&first_viewport) {
        println!();
        println!("# Impacted ({} insureds):", page.stats.count);
        for bucket in stats::impacted_breakdown(&page.stats) {
            println!(
                "  {:<12} {:>5.1}% ({} insureds)",
                bucket.label,
                bucket.share * 100.0,
                bucket.insureds
            );
        }
    }

    Ok(())
}
