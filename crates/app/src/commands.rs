use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use retail_clean::csv::{write_records, OutputColumns};
use retail_clean::{clean, CustomerReport, SalesReport};
use retail_core::{EtlConfig, Vocabulary};
use retail_storage::{DbPool, UpsertSummary};
use serde::Serialize;

pub const CUSTOMERS_FILE: &str = "Customer_Profiles_Cleaned.csv";
pub const SALES_FILE: &str = "Retail_Sales_Cleaned.csv";
pub const CATEGORY_FILE: &str = "Category_Cleaned.csv";
pub const PRODUCT_FILE: &str = "Product_Cleaned.csv";
pub const CUSTOMER_REPORT_FILE: &str = "customer_report.json";
pub const SALES_REPORT_FILE: &str = "sales_report.json";

#[derive(Debug, Serialize)]
pub struct TableLoad {
    pub table: &'static str,
    #[serde(flatten)]
    pub summary: UpsertSummary,
}

/// What one run read, wrote and loaded; serialized next to the cleaned files.
#[derive(Debug, Serialize)]
pub struct RunReport<R> {
    pub source: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub cleaning: R,
    pub load: Vec<TableLoad>,
}

pub async fn run_customers(
    config: &EtlConfig,
    vocabulary: &Vocabulary,
) -> anyhow::Result<RunReport<CustomerReport>> {
    tracing::info!(source = %config.source_path.display(), "cleaning customers");
    let batch = clean::clean_customers_csv(open_source(&config.source_path)?, vocabulary)
        .with_context(|| format!("reading {}", config.source_path.display()))?;

    prepare_output_dir(config)?;
    let customers_path = config.output_path(CUSTOMERS_FILE);
    write_csv(&customers_path, &batch.customers)?;

    let mut load = Vec::new();
    if let Some(pool) = connect(config).await? {
        let summary = retail_storage::upsert_customers(&pool, &batch.customers).await?;
        load.push(TableLoad {
            table: "customers",
            summary,
        });
        pool.close().await;
    }

    let report = RunReport {
        source: config.source_path.clone(),
        outputs: vec![customers_path],
        cleaning: batch.report,
        load,
    };
    write_report(&config.output_path(CUSTOMER_REPORT_FILE), &report)?;
    Ok(report)
}

pub async fn run_sales(
    config: &EtlConfig,
    vocabulary: &Vocabulary,
) -> anyhow::Result<RunReport<SalesReport>> {
    tracing::info!(source = %config.source_path.display(), "cleaning sales");
    let batch = clean::clean_sales_csv(open_source(&config.source_path)?, vocabulary)
        .with_context(|| format!("reading {}", config.source_path.display()))?;

    prepare_output_dir(config)?;
    let sales_path = config.output_path(SALES_FILE);
    let category_path = config.output_path(CATEGORY_FILE);
    let product_path = config.output_path(PRODUCT_FILE);
    write_csv(&sales_path, &batch.sales)?;
    write_csv(&category_path, &batch.categories)?;
    write_csv(&product_path, &batch.products)?;

    let mut load = Vec::new();
    if let Some(pool) = connect(config).await? {
        // dimensions before facts
        let categories = retail_storage::upsert_categories(&pool, &batch.categories).await?;
        let products = retail_storage::upsert_products(&pool, &batch.products).await?;
        let sales = retail_storage::upsert_sales(&pool, &batch.sales).await?;
        load.extend([
            TableLoad {
                table: "category",
                summary: categories,
            },
            TableLoad {
                table: "products",
                summary: products,
            },
            TableLoad {
                table: "sales",
                summary: sales,
            },
        ]);
        pool.close().await;
    }

    let report = RunReport {
        source: config.source_path.clone(),
        outputs: vec![sales_path, category_path, product_path],
        cleaning: batch.report,
        load,
    };
    write_report(&config.output_path(SALES_REPORT_FILE), &report)?;
    Ok(report)
}

fn open_source(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn prepare_output_dir(config: &EtlConfig) -> anyhow::Result<()> {
    if !config.output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("creating {}", config.output_dir.display()))?;
    }
    Ok(())
}

fn write_csv<T: Serialize + OutputColumns>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_records(BufWriter::new(file), rows)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote cleaned file");
    Ok(())
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

async fn connect(config: &EtlConfig) -> anyhow::Result<Option<DbPool>> {
    let Some(credentials) = &config.db_credentials else {
        tracing::info!("no database configured, skipping load");
        return Ok(None);
    };
    let pool = retail_storage::create_db(credentials)
        .await
        .context("connecting to database")?;
    Ok(Some(pool))
}
