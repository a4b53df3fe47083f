use chrono::{NaiveDate, NaiveTime};
use retail_core::{CategoryRow, CleanCustomer, CleanSale, DbCredentials, Money, ProductRow};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

use crate::{StorageError, UpsertSummary};

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(credentials: &DbCredentials) -> Result<DbPool, StorageError> {
    let options = SqliteConnectOptions::from_str(&credentials.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(credentials.max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    tracing::debug!(url = %credentials.url, "database ready");

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            customer_id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            full_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            age INTEGER NOT NULL,
            email TEXT NOT NULL,
            signup_date TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS category (
            category_id INTEGER PRIMARY KEY,
            category_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            product_id INTEGER PRIMARY KEY,
            product_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Unmapped rows carry id 0, which never appears in the dimension tables,
    // so product_id and category_id are not foreign keys. Unit prices keep
    // their extracted precision as decimal text; totals are whole cents.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sales (
            transaction_id TEXT PRIMARY KEY,
            sale_date TEXT,
            sale_time TEXT,
            customer_id TEXT,
            product_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            quantity INTEGER,
            unit_price TEXT,
            total_sale_cents INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn cents(amount: Option<Money>) -> Result<Option<i64>, StorageError> {
    amount
        .map(|m| m.to_cents().ok_or(StorageError::AmountOutOfRange(m)))
        .transpose()
}

// ── Upserts ───────────────────────────────────────────────────────────────────

pub async fn upsert_customers(
    pool: &DbPool,
    customers: &[CleanCustomer],
) -> Result<UpsertSummary, StorageError> {
    let mut summary = UpsertSummary::default();
    let mut tx = pool.begin().await?;

    for c in customers {
        let Some(customer_id) = c.customer_id.as_deref() else {
            summary.skipped += 1;
            continue;
        };
        sqlx::query(
            r#"
            INSERT INTO customers
                (customer_id, first_name, last_name, full_name, gender, age, email, signup_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(customer_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                full_name = excluded.full_name,
                gender = excluded.gender,
                age = excluded.age,
                email = excluded.email,
                signup_date = excluded.signup_date
            "#,
        )
        .bind(customer_id)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.full_name)
        .bind(&c.gender)
        .bind(i64::from(c.age))
        .bind(&c.email)
        .bind(c.signup_date)
        .execute(&mut *tx)
        .await?;
        summary.written += 1;
    }

    tx.commit().await?;
    summary.log("customers");
    Ok(summary)
}

pub async fn upsert_categories(
    pool: &DbPool,
    categories: &[CategoryRow],
) -> Result<UpsertSummary, StorageError> {
    let mut summary = UpsertSummary::default();
    let mut tx = pool.begin().await?;

    for row in categories {
        sqlx::query(
            "INSERT INTO category (category_id, category_name) VALUES (?, ?)
             ON CONFLICT(category_id) DO UPDATE SET category_name = excluded.category_name",
        )
        .bind(row.category_id)
        .bind(&row.category_name)
        .execute(&mut *tx)
        .await?;
        summary.written += 1;
    }

    tx.commit().await?;
    summary.log("category");
    Ok(summary)
}

pub async fn upsert_products(
    pool: &DbPool,
    products: &[ProductRow],
) -> Result<UpsertSummary, StorageError> {
    let mut summary = UpsertSummary::default();
    let mut tx = pool.begin().await?;

    for row in products {
        sqlx::query(
            "INSERT INTO products (product_id, product_name) VALUES (?, ?)
             ON CONFLICT(product_id) DO UPDATE SET product_name = excluded.product_name",
        )
        .bind(row.product_id)
        .bind(&row.product_name)
        .execute(&mut *tx)
        .await?;
        summary.written += 1;
    }

    tx.commit().await?;
    summary.log("products");
    Ok(summary)
}

pub async fn upsert_sales(pool: &DbPool, sales: &[CleanSale]) -> Result<UpsertSummary, StorageError> {
    let mut summary = UpsertSummary::default();
    let mut tx = pool.begin().await?;

    for s in sales {
        let Some(transaction_id) = s.transaction_id.as_deref() else {
            summary.skipped += 1;
            continue;
        };
        sqlx::query(
            r#"
            INSERT INTO sales
                (transaction_id, sale_date, sale_time, customer_id, product_id, category_id,
                 quantity, unit_price, total_sale_cents)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(transaction_id) DO UPDATE SET
                sale_date = excluded.sale_date,
                sale_time = excluded.sale_time,
                customer_id = excluded.customer_id,
                product_id = excluded.product_id,
                category_id = excluded.category_id,
                quantity = excluded.quantity,
                unit_price = excluded.unit_price,
                total_sale_cents = excluded.total_sale_cents
            "#,
        )
        .bind(transaction_id)
        .bind(s.sale_date)
        .bind(s.sale_time)
        .bind(s.customer_id.as_deref())
        .bind(s.product_id)
        .bind(s.category_id)
        .bind(s.quantity.map(i64::from))
        .bind(s.unit_price.map(|p| p.to_string()))
        .bind(cents(s.total_sale)?)
        .execute(&mut *tx)
        .await?;
        summary.written += 1;
    }

    tx.commit().await?;
    summary.log("sales");
    Ok(summary)
}

// ── Reads ─────────────────────────────────────────────────────────────────────

pub async fn get_customer(
    pool: &DbPool,
    customer_id: &str,
) -> Result<Option<CleanCustomer>, StorageError> {
    let row = sqlx::query_as::<_, (String, String, String, String, String, i64, String, Option<NaiveDate>)>(
        "SELECT customer_id, first_name, last_name, full_name, gender, age, email, signup_date FROM customers WHERE customer_id = ?"
    )
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| CleanCustomer {
        customer_id: Some(r.0),
        first_name: r.1,
        last_name: r.2,
        full_name: r.3,
        gender: r.4,
        age: u32::try_from(r.5).unwrap_or_default(),
        email: r.6,
        signup_date: r.7,
    }))
}

pub async fn get_sale(pool: &DbPool, transaction_id: &str) -> Result<Option<CleanSale>, StorageError> {
    type SaleRow = (
        String,
        Option<NaiveDate>,
        Option<NaiveTime>,
        Option<String>,
        i64,
        i64,
        Option<i64>,
        Option<String>,
        Option<i64>,
    );
    let row = sqlx::query_as::<_, SaleRow>(
        "SELECT transaction_id, sale_date, sale_time, customer_id, product_id, category_id, quantity, unit_price, total_sale_cents FROM sales WHERE transaction_id = ?"
    )
    .bind(transaction_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| CleanSale {
        transaction_id: Some(r.0),
        sale_date: r.1,
        sale_time: r.2,
        customer_id: r.3,
        product_id: r.4,
        category_id: r.5,
        quantity: r.6.and_then(|q| u32::try_from(q).ok()),
        unit_price: r.7.and_then(|p| Decimal::from_str(&p).ok()),
        total_sale: r.8.map(Money::from_cents),
    }))
}

pub async fn get_categories(pool: &DbPool) -> Result<Vec<CategoryRow>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT category_id, category_name FROM category ORDER BY category_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(category_id, category_name)| CategoryRow {
            category_id,
            category_name,
        })
        .collect())
}

pub async fn get_products(pool: &DbPool) -> Result<Vec<ProductRow>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT product_id, product_name FROM products ORDER BY product_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(product_id, product_name)| ProductRow {
            product_id,
            product_name,
        })
        .collect())
}
