//! Demo: build a user-data batch, print it, and push it through the stream
//! codec.
//!
//! Run with:  `cargo run --example user_batch`

use std::sync::Arc;

use anyhow::Result;
use columnar_bridge::{
    decode, encode, export_batch, Column, Field, Int32Vector, LogicalType, MemoryPool,
    RecordBatch, Schema, Utf8Vector,
};
use tracing::{info, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Columnar bridge - user batch demo");

    let pool = MemoryPool::default();

    let schema = Arc::new(Schema::new(vec![
        Field::nullable("id", LogicalType::Int32)?,
        Field::nullable("name", LogicalType::Utf8)?,
        Field::nullable("age", LogicalType::Int32)?,
        Field::nullable("email", LogicalType::Utf8)?,
        Field::nullable("salary", LogicalType::Utf8)?,
    ]));

    let names = [
        "Maya Iversen",
        "Rui Tanaka",
        "Lena Osei",
        "Piotr Nowak",
        "Sofia Marchetti",
        "Derek Hall",
    ];
    let emails = [
        "maya@example.com",
        "rui@example.net",
        "lena@example.org",
        "piotr@example.pl",
        "sofia@example.it",
        "derek@example.co",
    ];
    let ages = [Some(31), None, Some(27), Some(44), Some(29), None];
    let salaries = [
        Some("$72,000"),
        Some("$88,500"),
        None,
        Some("$105,000"),
        Some("$64,250"),
        Some("$91,000"),
    ];
    let rows = names.len();

    let mut id = Int32Vector::allocate_new(&pool, rows)?;
    let mut name = Utf8Vector::allocate_new(&pool, rows * 20, rows)?;
    let mut age = Int32Vector::allocate_new(&pool, rows)?;
    let mut email = Utf8Vector::allocate_new(&pool, rows * 25, rows)?;
    let mut salary = Utf8Vector::allocate_new(&pool, rows * 10, rows)?;

    for i in 0..rows {
        id.set(i, i as i32 + 1)?;
        name.set(i, names[i])?;
        match ages[i] {
            Some(a) => age.set(i, a)?,
            None => age.set_null(i)?,
        }
        email.set(i, emails[i])?;
        match salaries[i] {
            Some(s) => salary.set(i, s)?,
            None => salary.set_null(i)?,
        }
    }

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Column::Int32(id.set_value_count(rows)?),
            Column::Utf8(name.set_value_count(rows)?),
            Column::Int32(age.set_value_count(rows)?),
            Column::Utf8(email.set_value_count(rows)?),
            Column::Utf8(salary.set_value_count(rows)?),
        ],
    )?;

    info!(
        rows = batch.row_count(),
        columns = batch.num_columns(),
        pool_bytes = pool.allocated_bytes(),
        "built batch"
    );
    print_batch(&batch);

    // By-reference export: what a native consumer would receive.
    let exported = export_batch(&batch);
    info!(
        descriptors = exported.columns().len(),
        "exported batch as pointer descriptors"
    );

    // Byte-stream transfer and back.
    let bytes = encode(&batch);
    info!(bytes = bytes.len(), "serialized batch");

    let decoded = decode(&bytes, &pool)?;
    assert_eq!(decoded, batch);
    info!("round trip verified");

    Ok(())
}

fn print_batch(batch: &RecordBatch) {
    for row in 0..batch.row_count() {
        let mut cells = Vec::with_capacity(batch.num_columns());
        for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
            let rendered = match column {
                Column::Int32(c) => c
                    .value(row)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "null".to_string()),
                Column::Utf8(c) => c
                    .value(row)
                    .map(|v| format!("'{v}'"))
                    .unwrap_or_else(|| "null".to_string()),
            };
            cells.push(format!("{}={}", field.name(), rendered));
        }
        info!("  row {}: {}", row, cells.join(", "));
    }
}
