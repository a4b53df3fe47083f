use retail_clean::{normalize_customers, normalize_sales};
use retail_core::{CleanSale, Money, RawCustomer, RawSale, Vocabulary};

fn customer(fields: [&str; 8]) -> RawCustomer {
    let f = |i: usize| Some(fields[i].to_string()).filter(|s| !s.is_empty());
    RawCustomer {
        customer_id: f(0),
        first_name: f(1),
        last_name: f(2),
        full_name: f(3),
        gender: f(4),
        age: f(5),
        signup_date: f(6),
        email: f(7),
    }
}

fn dirty_customers() -> Vec<RawCustomer> {
    vec![
        customer(["C1", " anbhony ", "davis", "Tony Davis", "male", "", "2023/02/30", "ANBHONY.DAVIS@GMAILCOM"]),
        customer(["C2", "SUSAN", "write", "susan white", "Female", "34", "03/04/2023", "susan.whiteyahoo.com"]),
        customer(["C3", "brian", "", "Brian", "Unknown", "52.7", "2022-11-01", "brian@outlook.com"]),
        customer(["C4", "Briln", "Gsrcia", "", "X", "abc", "", "no-at-sign"]),
        customer(["C5", "mary ann", "o'neil", "Mary Ann O'Neil", "", "-3", "March 5, 2023", "mao@company.co.uk"]),
        customer(["", "", "", "", "", "", "", ""]),
    ]
}

fn sale(fields: [&str; 11]) -> RawSale {
    let f = |i: usize| Some(fields[i].to_string()).filter(|s| !s.is_empty());
    RawSale {
        transaction_id: f(0),
        sale_date: f(1),
        sale_time: f(2),
        category_id: f(3),
        category_name: f(4),
        product_id: f(5),
        product_name: f(6),
        quantity: f(7),
        unit_price: f(8),
        total_sale: f(9),
        customer_id: f(10),
    }
}

fn dirty_sales() -> Vec<RawSale> {
    vec![
        sale(["TXN001", "2023-01-05", "10.15", "", "furnture items", "", "Office Chiar", "1", "$120.00", "", "C1"]),
        sale(["TXN002", "01/06/2023", "1430", "1", "", "", "Wireles Muose", "2", "19.99", "", "C2"]),
        sale(["#003", "", "", "", "Grocry", "", "Banana", "", "2.50", "7.50", "C3"]),
        sale(["004", "2023-01-07", "9:05:00", "3", "Stationery", "302", "", "", "", "", "C4"]),
        sale(["005", "bad date", "25:00", "", "toys", "", "", "3.0", "4.335", "", ""]),
        sale(["006", "2023-01-08", "", "2.0", "Furniture", "202", "standng desk", "1", "300", "300.00", "C5"]),
        sale(["007", "", "", "4", "", "", "coffee beans 1kg", "", "12.00", "30.00", ""]),
    ]
}

// ── customers ─────────────────────────────────────────────────────────────────

#[test]
fn customer_names_and_emails_are_consistent() {
    let batch = normalize_customers(&dirty_customers(), &Vocabulary::default());
    assert_eq!(batch.customers.len(), dirty_customers().len());
    for c in &batch.customers {
        assert_eq!(c.full_name, format!("{} {}", c.first_name, c.last_name));
        if !c.email.is_empty() {
            let (local, _) = c.email.split_once('@').unwrap();
            assert_eq!(local, format!("{}.{}", c.first_name, c.last_name).to_lowercase());
        }
        assert!(["M", "F", "", "X"].contains(&c.gender.as_str()));
    }
}

#[test]
fn customer_example_row() {
    let batch = normalize_customers(&dirty_customers(), &Vocabulary::default());
    let c = &batch.customers[0];
    assert_eq!(c.first_name, "Anthony");
    assert_eq!(c.last_name, "Davis");
    assert_eq!(c.full_name, "Anthony Davis");
    assert_eq!(c.gender, "M");
    // mean of 34 and 52.7
    assert_eq!(c.age, 43);
    assert_eq!(c.email, "anthony.davis@gmail.com");
    assert_eq!(c.signup_date, None);

    let c4 = &batch.customers[3];
    assert_eq!((c4.first_name.as_str(), c4.last_name.as_str()), ("Brian", "Garcia"));
    assert_eq!(c4.email, "");
}

#[test]
fn customer_normalizer_is_idempotent() {
    let vocab = Vocabulary::default();
    let first = normalize_customers(&dirty_customers(), &vocab).customers;
    let again: Vec<RawCustomer> = first.iter().map(RawCustomer::from).collect();
    let second = normalize_customers(&again, &vocab).customers;
    assert_eq!(first, second);
}

// ── sales ─────────────────────────────────────────────────────────────────────

#[test]
fn categories_agree_with_vocabulary() {
    let vocab = Vocabulary::default();
    let batch = normalize_sales(&dirty_sales(), &vocab);
    for row in &batch.categories {
        match vocab.categories.name_for(row.category_id) {
            Some(name) => assert_eq!(name, row.category_name),
            None => assert_eq!(row.category_id, vocab.categories.unmapped_id),
        }
    }
    for s in &batch.sales {
        assert!(
            s.category_id == 0 || vocab.categories.name_for(s.category_id).is_some(),
            "category {} outside vocabulary",
            s.category_id
        );
    }
}

#[test]
fn rows_survive_iff_quantity_or_total_present() {
    let raw = dirty_sales();
    let batch = normalize_sales(&raw, &Vocabulary::default());
    let expected: Vec<Option<&str>> = raw
        .iter()
        .filter(|r| r.quantity.is_some() || r.total_sale.is_some())
        .map(|r| r.transaction_id.as_deref())
        .collect();
    assert_eq!(expected.len(), 6);
    assert_eq!(batch.sales.len(), expected.len());
    assert_eq!(batch.report.rows_dropped, 1);
}

#[test]
fn derived_totals_are_rounded_products() {
    let raw = dirty_sales();
    let batch = normalize_sales(&raw, &Vocabulary::default());
    let derived: Vec<&CleanSale> = batch
        .sales
        .iter()
        .zip(raw.iter().filter(|r| r.quantity.is_some() || r.total_sale.is_some()))
        .filter(|(_, r)| r.total_sale.is_none())
        .map(|(s, _)| s)
        .collect();
    assert_eq!(derived.len(), 3);
    for s in derived {
        let expected = Money::from_decimal(
            s.unit_price.unwrap() * rust_decimal::Decimal::from(s.quantity.unwrap()),
        );
        assert_eq!(s.total_sale, Some(expected));
    }
}

#[test]
fn totals_round_after_multiplying_the_extracted_price() {
    let batch = normalize_sales(&dirty_sales(), &Vocabulary::default());
    let s = batch
        .sales
        .iter()
        .find(|s| s.transaction_id.as_deref() == Some("005"))
        .unwrap();
    // 3 x 4.335 = 13.005, half-to-even
    assert_eq!(s.unit_price, Some(rust_decimal::Decimal::new(4335, 3)));
    assert_eq!(s.total_sale, Some(Money::from_cents(1300)));
}

#[test]
fn products_resolve_through_fuzzy_matching() {
    let batch = normalize_sales(&dirty_sales(), &Vocabulary::default());
    let ids: Vec<i64> = batch.sales.iter().map(|s| s.product_id).collect();
    assert_eq!(ids, vec![201, 101, 0, 0, 202, 401]);

    let dim: Vec<(i64, &str)> = batch
        .products
        .iter()
        .map(|p| (p.product_id, p.product_name.as_str()))
        .collect();
    assert_eq!(
        dim,
        vec![
            (201, "Office Chair"),
            (101, "Wireless Mouse"),
            (202, "Standing Desk"),
            (401, "Coffee Beans 1Kg"),
        ]
    );
}

#[test]
fn furnture_items_becomes_furniture() {
    let batch = normalize_sales(&dirty_sales(), &Vocabulary::default());
    assert_eq!(batch.sales[0].category_id, 2);
    assert!(batch
        .categories
        .iter()
        .any(|c| c.category_id == 2 && c.category_name == "Furniture"));
}

#[test]
fn sales_normalizer_is_idempotent() {
    let vocab = Vocabulary::default();
    let first = normalize_sales(&dirty_sales(), &vocab).sales;
    let again: Vec<RawSale> = first.iter().map(RawSale::from).collect();
    let second = normalize_sales(&again, &vocab).sales;
    assert_eq!(first, second);
}
