//! `shopcat scrape`: one store, one sink.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use shopcat_core::AppConfig;
use shopcat_pipeline::{
    CsvSink, DocumentSink, JsonFileSink, PgDocumentStore, Pipeline, PipelineSummary, ProductSink,
};
use shopcat_scraper::{ApiAgent, StopHandle};

/// Where scraped products go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Append flat rows to a CSV file
    Csv,
    /// Write flat rows to a JSON file, replacing it
    Json,
    /// Upsert raw products into the database
    Document,
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Storefront URL, e.g. `https://drinkcann.com`
    #[arg(long)]
    pub store_url: String,

    /// Stop after this many products
    #[arg(long)]
    pub limit: Option<usize>,

    /// Destination for the scraped products
    #[arg(long, value_enum, default_value_t = SinkKind::Csv)]
    pub sink: SinkKind,

    /// Output file for the csv and json sinks
    /// [default: $SHOPCAT_OUTPUT_DIR/shopify_products.{csv,json}]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// YAML scrape profile overriding scraper settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Runs the scrape pipeline with the sink selected on the command line.
///
/// # Errors
///
/// Returns an error if the profile is invalid, the store is unreachable, the
/// fetch yields nothing but an error, or the sink cannot write.
pub(crate) async fn run_scrape(mut config: AppConfig, args: ScrapeArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.config {
        shopcat_core::load_scrape_profile(path)?.apply(&mut config);
    }
    if let Some(limit) = args.limit {
        anyhow::ensure!(limit > 0, "--limit must be greater than zero");
        config.scraper_max_products = Some(limit);
    }

    let stop = StopHandle::new();
    let agent = ApiAgent::from_config(&config, &args.store_url)?.with_stop_handle(stop.clone());
    stop_on_ctrl_c(stop);

    let summary = match args.sink {
        SinkKind::Csv => {
            let path = output_path(&config.output_dir, args.output.as_ref(), "csv");
            run_pipeline(agent, CsvSink::new(path)).await?
        }
        SinkKind::Json => {
            let path = output_path(&config.output_dir, args.output.as_ref(), "json");
            run_pipeline(agent, JsonFileSink::new(path)).await?
        }
        SinkKind::Document => {
            let pool = shopcat_db::connect_pool_from_config(&config).await?;
            run_pipeline(agent, DocumentSink::new(PgDocumentStore::new(pool))).await?
        }
    };

    print_summary(&summary);
    println!(
        "scraped and stored {} products",
        stored_products(args.sink, &summary)
    );
    Ok(())
}

/// Products that reached the sink. The document sink counts products itself;
/// file sinks count rows, so their products are the distinct ids flattened.
fn stored_products(sink: SinkKind, summary: &PipelineSummary) -> usize {
    match sink {
        SinkKind::Document => summary.written,
        SinkKind::Csv | SinkKind::Json => summary.metrics.products,
    }
}

async fn run_pipeline<S: ProductSink>(
    agent: ApiAgent,
    sink: S,
) -> anyhow::Result<PipelineSummary> {
    let mut pipeline = Pipeline::new(agent, sink);
    let summary = pipeline.run().await?;
    Ok(summary)
}

fn output_path(output_dir: &Path, output: Option<&PathBuf>, extension: &str) -> PathBuf {
    output
        .cloned()
        .unwrap_or_else(|| output_dir.join(format!("shopify_products.{extension}")))
}

/// Trips `stop` on Ctrl-C; the fetch loop ends before its next page.
fn stop_on_ctrl_c(stop: StopHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received ctrl-c, stopping after the current page");
            stop.stop();
        }
    });
}

fn print_summary(summary: &PipelineSummary) {
    let metrics = &summary.metrics;
    println!("store:      {}", summary.store_url);
    println!("requests:   {}", summary.requests);
    println!("products:   {}", summary.products_fetched);
    println!("rows:       {}", summary.rows);
    println!("written:    {}", summary.written);
    println!(
        "available:  {} of {} rows",
        metrics.available_rows, metrics.rows
    );
    match metrics.average_price {
        Some(avg) => println!("avg price:  {avg} ({} priced rows)", metrics.priced_rows),
        None => println!("avg price:  n/a"),
    }
    if !summary.complete {
        println!("warning: fetch ended early; the catalog may be incomplete");
    }
}
