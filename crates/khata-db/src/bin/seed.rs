//! # Seed Data Generator
//!
//! Populates the database with test products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p khata-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p khata-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p khata-db --bin seed -- --db ./data/khata.db
//! ```
//!
//! ## Generated Products
//! Creates realistic kirana-store catalog data across categories:
//! - Beverages (soft drinks, juices, water)
//! - Snacks (chips, biscuits, chocolate)
//! - Dairy (milk, butter, yogurt)
//! - Staples (flour, rice, lentils, oil)
//! - Household (soap, detergent, toothpaste)
//!
//! Each product has:
//! - Barcode (EAN-13 shaped, checksum not valid)
//! - MRP between Rs 20 and Rs 900 (in paisa)
//! - Sale price a few percent under MRP
//! - Random opening stock: 0 - 100 units

use chrono::Utc;
use std::env;

use khata_core::Product;
use khata_db::repository::generate_id;
use khata_db::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Coca-Cola 1.5L",
            "Pepsi 1.5L",
            "Sprite 500ml",
            "Fanta 500ml",
            "7-Up 1L",
            "Nestle Fruita Vitals Mango",
            "Nestle Fruita Vitals Apple",
            "Shezan Mango Juice",
            "Rooh Afza 800ml",
            "Tang Orange 750g",
            "Nestle Pure Life 1.5L",
            "Aquafina 500ml",
            "Lipton Yellow Label 190g",
            "Tapal Danedar 190g",
            "Nescafe Classic 50g",
        ],
    ),
    (
        "Snacks",
        &[
            "Lays Masala",
            "Lays Salted",
            "Kurkure Chutney",
            "Slanty Jalapeno",
            "Oye Hoye Spicy",
            "Sooper Biscuit",
            "Prince Biscuit",
            "Oreo Original",
            "Rio Chocolate",
            "Candi Biscuit",
            "Dairy Milk 38g",
            "KitKat 4 Finger",
            "Jubilee Original",
            "Now Chocolate",
            "Ding Dong Bubble",
        ],
    ),
    (
        "Dairy",
        &[
            "Olpers Milk 1L",
            "Milkpak 1L",
            "Olpers Cream 200ml",
            "Nestle Yogurt 400g",
            "Nurpur Butter 200g",
            "Blue Band Margarine 100g",
            "Adams Cheese Slices",
            "Olpers Lassi 225ml",
            "Day Fresh Flavored Milk",
            "Nestle Everyday 600g",
        ],
    ),
    (
        "Staples",
        &[
            "Fine Atta 10kg",
            "Super Basmati Rice 5kg",
            "Daal Chana 1kg",
            "Daal Masoor 1kg",
            "Daal Mong 1kg",
            "Dalda Cooking Oil 1L",
            "Sufi Banaspati 1kg",
            "White Sugar 1kg",
            "Pink Salt 800g",
            "National Red Chilli 200g",
            "National Garam Masala 50g",
            "Shan Biryani Masala",
            "Kolson Vermicelli 150g",
            "Bake Parlor Macaroni 400g",
            "Mitchells Ketchup 300g",
        ],
    ),
    (
        "Household",
        &[
            "Lifebuoy Soap 146g",
            "Lux Soap 128g",
            "Safeguard Soap 135g",
            "Surf Excel 1kg",
            "Ariel 1kg",
            "Bonus Tristar 1kg",
            "Colgate Toothpaste 100g",
            "Medicam Toothpaste 90g",
            "Head & Shoulders 185ml",
            "Sunsilk Shampoo 185ml",
            "Dettol Liquid 250ml",
            "Max Dishwash Bar",
            "Mortein Coil",
            "Tissue Box 150x2",
            "Match Box Pack",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./khata_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Khata Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./khata_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Khata Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category, names)) in CATEGORIES.iter().enumerate() {
        // Cycle variants so small catalogs stay varied and large ones
        // still get unique barcodes.
        for variant in 0..(count / names.len() + 1) {
            for (name_idx, name) in names.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 10_000 + variant * 100 + name_idx;
                let product = generate_product(category, name, variant, seed);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let in_stock = db.products().list_in_stock().await?;
    let low = db.products().low_stock().await?;
    println!("  In stock: {} products", in_stock.len());
    println!("  At/below reorder point: {} products", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(category: &str, name: &str, variant: usize, seed: usize) -> Product {
    let now = Utc::now();

    // EAN-13 shaped barcode (checksum not valid)
    let barcode = Some(format!("896{:010}", seed));

    // MRP: Rs 20.00 - Rs 900.00 in paisa
    let mrp_paisa = 2_000 + ((seed * 137) % 88_000) as i64;

    // Sale price: 2-8% under MRP
    let discount_pct = 2 + (seed % 7) as i64;
    let sale_price_paisa = mrp_paisa - mrp_paisa * discount_pct / 100;

    // Random opening stock (0-100) and a modest reorder point
    let quantity_on_hand = (seed % 101) as i64;
    let reorder_point = 5 + (seed % 10) as i64;

    let name = if variant == 0 {
        name.to_string()
    } else {
        format!("{} (Pack of {})", name, variant + 1)
    };

    Product {
        id: generate_id(),
        barcode,
        name,
        category: category.to_string(),
        mrp_paisa,
        sale_price_paisa,
        quantity_on_hand,
        reorder_point,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
