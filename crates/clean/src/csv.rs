use retail_core::{CategoryRow, CleanCustomer, CleanSale, ProductRow, RawCustomer, RawSale};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use thiserror::Error;

pub const CUSTOMER_COLUMNS: &[&str] = &[
    "customer_id",
    "first_name",
    "last_name",
    "full_name",
    "gender",
    "age",
    "signup_date",
    "email",
];

pub const SALES_COLUMNS: &[&str] = &[
    "transaction_id",
    "sale_date",
    "sale_time",
    "category_id",
    "category",
    "product_id",
    "product",
    "quantity",
    "price_per_unit",
    "total_sale",
    "customer_id",
];

/// Header of a cleaned output file, in field order.
pub trait OutputColumns {
    const COLUMNS: &'static [&'static str];
}

impl OutputColumns for CleanCustomer {
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "first_name",
        "last_name",
        "full_name",
        "gender",
        "age",
        "email",
        "signup_date",
    ];
}

impl OutputColumns for CleanSale {
    const COLUMNS: &'static [&'static str] = &[
        "transaction_id",
        "sale_date",
        "sale_time",
        "customer_id",
        "product_id",
        "category_id",
        "quantity",
        "unit_price",
        "total_sale",
    ];
}

impl OutputColumns for CategoryRow {
    const COLUMNS: &'static [&'static str] = &["category_id", "category_name"];
}

impl OutputColumns for ProductRow {
    const COLUMNS: &'static [&'static str] = &["product_id", "product_name"];
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

pub fn read_customers<R: Read>(data: R) -> Result<Vec<RawCustomer>, CsvError> {
    read_records(data, CUSTOMER_COLUMNS)
}

pub fn read_sales<R: Read>(data: R) -> Result<Vec<RawSale>, CsvError> {
    read_records(data, SALES_COLUMNS)
}

/// Reads every row by header name. Empty fields come back as `None`; extra
/// columns are ignored.
fn read_records<R: Read, T: DeserializeOwned>(
    data: R,
    required: &[&str],
) -> Result<Vec<T>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if let Some(missing) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(CsvError::MissingColumn(missing.to_string()));
    }

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    tracing::debug!(rows = rows.len(), "read csv");
    Ok(rows)
}

/// Writes the header, then `rows`. An empty slice still gets its header.
pub fn write_records<W: Write, T: Serialize + OutputColumns>(
    writer: W,
    rows: &[T],
) -> Result<(), CsvError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use retail_core::Money;

    #[test]
    fn read_customers_empty_fields_are_none() {
        let data = " customer_id , first_name,last_name,full_name,gender,age,signup_date,email\n\
                    C1,anbhony,davis,,male,,2023/02/30,ANBHONY.DAVIS@GMAILCOM\n";
        let rows = read_customers(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id.as_deref(), Some("C1"));
        assert_eq!(rows[0].full_name, None);
        assert_eq!(rows[0].age, None);
        assert_eq!(rows[0].email.as_deref(), Some("ANBHONY.DAVIS@GMAILCOM"));
    }

    #[test]
    fn read_sales_maps_source_column_names() {
        let data = "transaction_id,sale_date,sale_time,category_id,category,product_id,product,quantity,price_per_unit,total_sale,customer_id\n\
                    TXN1,2023-01-05,10.15,,furniture,,Office Chiar,1,$120.00,,C9\n";
        let rows = read_sales(data.as_bytes()).unwrap();
        assert_eq!(rows[0].category_name.as_deref(), Some("furniture"));
        assert_eq!(rows[0].product_name.as_deref(), Some("Office Chiar"));
        assert_eq!(rows[0].unit_price.as_deref(), Some("$120.00"));
        assert_eq!(rows[0].category_id, None);
    }

    #[test]
    fn missing_column_is_reported() {
        let data = "customer_id,first_name\nC1,Ann\n";
        let err = read_customers(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn(c) if c == "last_name"));
    }

    #[test]
    fn write_records_uses_field_names_as_header() {
        let rows = vec![
            CategoryRow {
                category_id: 1,
                category_name: "Electronics".to_string(),
            },
            CategoryRow {
                category_id: 2,
                category_name: "Furniture".to_string(),
            },
        ];
        let mut out = Vec::new();
        write_records(&mut out, &rows).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "category_id,category_name\n1,Electronics\n2,Furniture\n"
        );
    }

    #[test]
    fn write_records_leaves_absent_values_empty() {
        let sale = CleanSale {
            transaction_id: Some("7".to_string()),
            sale_date: None,
            sale_time: None,
            customer_id: None,
            product_id: 0,
            category_id: 0,
            quantity: Some(1),
            unit_price: None,
            total_sale: Money::parse("4.50"),
        };
        let mut out = Vec::new();
        write_records(&mut out, &[sale]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("transaction_id,sale_date,sale_time,customer_id,product_id,category_id,quantity,unit_price,total_sale")
        );
        assert_eq!(lines.next(), Some("7,,,,0,0,1,,4.50"));
    }

    #[test]
    fn empty_tables_still_get_a_header() {
        let mut out = Vec::new();
        write_records::<_, CategoryRow>(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "category_id,category_name\n");

        let mut out = Vec::new();
        write_records::<_, ProductRow>(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "product_id,product_name\n");
    }

    /// Header as serde would name the fields of `row`.
    fn serde_header<T: Serialize>(row: &T) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(row).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        text.lines().next().unwrap().to_string()
    }

    #[test]
    fn output_columns_follow_field_order() {
        let customer = CleanCustomer {
            customer_id: Some("C1".to_string()),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            full_name: "Ann Lee".to_string(),
            gender: "F".to_string(),
            age: 30,
            email: String::new(),
            signup_date: NaiveDate::from_ymd_opt(2023, 1, 1),
        };
        assert_eq!(serde_header(&customer), CleanCustomer::COLUMNS.join(","));

        let sale = CleanSale {
            transaction_id: None,
            sale_date: None,
            sale_time: None,
            customer_id: None,
            product_id: 0,
            category_id: 0,
            quantity: None,
            unit_price: None,
            total_sale: None,
        };
        assert_eq!(serde_header(&sale), CleanSale::COLUMNS.join(","));

        let product = ProductRow {
            product_id: 101,
            product_name: "Wireless Mouse".to_string(),
        };
        assert_eq!(serde_header(&product), ProductRow::COLUMNS.join(","));
    }
}
