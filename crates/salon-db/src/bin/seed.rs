//! # Seed Data Generator
//!
//! Populates a back office database with demo data for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p salon-db --bin seed
//!
//! # Specify database path
//! cargo run -p salon-db --bin seed -- --db ./data/salon.db
//! ```
//!
//! ## Generated Records
//! - Suppliers with zero balances
//! - Customers with empty visit logs
//! - One open shift, so sales recorded right away reach a shift ledger
//!
//! Nothing is written when the database already has suppliers.

use chrono::Utc;
use std::env;

use salon_core::{Customer, SalesDetails, Shift, ShiftStatus, Supplier, SupplierStatus};
use salon_db::repository::new_id;
use salon_db::{Database, DbConfig};

/// (name, phone, address)
const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Nile Beauty Supplies", "0223456789", "Nasr City, Cairo"),
    ("Delta Cosmetics", "0403334455", "Tanta"),
    ("Alexandria Hair Care", "0354443322", "Smouha, Alexandria"),
    ("Pharaoh Nail Studio Wholesale", "0227778899", "Dokki, Giza"),
];

/// (name, phone, vip)
const CUSTOMERS: &[(&str, &str, bool)] = &[
    ("Salma Adel", "0100000000", true),
    ("Mariam Hassan", "0111222333", false),
    ("Nour El-Din", "0122333444", false),
    ("Hana Mostafa", "0155666777", false),
    ("Yasmin Farouk", "0109988776", true),
];

const STARTING_CASH_CENTS: i64 = 50_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./salon_dev.db");
    let mut cashier = String::from("Reception");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--cashier" | "-c" => {
                if i + 1 < args.len() {
                    cashier = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Salon Back Office Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>         Database file path (default: ./salon_dev.db)");
                println!("  -c, --cashier <NAME>    Cashier of the open shift (default: Reception)");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Salon Back Office Seed Data Generator");
    println!("========================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.suppliers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} suppliers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    for (name, phone, address) in SUPPLIERS {
        let supplier = Supplier {
            id: new_id(),
            name: name.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            status: SupplierStatus::Active,
            balance_cents: 0,
            total_purchases_cents: 0,
            total_paid_cents: 0,
            notes: String::new(),
            created_at: now,
            updated_at: now,
            sync_version: 0,
        };
        db.suppliers().insert(&supplier).await?;
    }
    println!("✓ Created {} suppliers", SUPPLIERS.len());

    let mut created = 0;
    for (name, phone, vip) in CUSTOMERS {
        let customer = Customer {
            id: new_id(),
            name: name.to_string(),
            email: None,
            phone: phone.to_string(),
            visits: 0,
            spending_cents: 0,
            vip: *vip,
            visit_history: Vec::new(),
            created_at: now,
            updated_at: now,
            sync_version: 0,
        };

        if let Err(e) = db.customers().insert(&customer).await {
            eprintln!("Failed to insert {}: {}", customer.name, e);
            continue;
        }
        created += 1;
    }
    println!("✓ Created {} customers", created);

    match db.shifts().find_open().await? {
        Some(open) => println!("✓ Shift already open for {}", open.cashier),
        None => {
            let shift = Shift {
                id: new_id(),
                cashier: cashier.clone(),
                start_time: now.format("%H:%M").to_string(),
                end_time: None,
                starting_cash_cents: STARTING_CASH_CENTS,
                total_sales_cents: 0,
                total_expenses_cents: 0,
                final_cash_cents: 0,
                status: ShiftStatus::Open,
                sales_details: SalesDetails::default(),
                opened_at: now,
                closed_at: None,
                updated_at: now,
                sync_version: 0,
            };
            db.shifts().insert(&shift).await?;
            println!("✓ Opened shift for {}", cashier);
        }
    }

    println!();
    println!("🎉 Seed complete!");

    db.close().await;
    Ok(())
}
