//! Demo catalog seeding for local development.

use rust_decimal::Decimal;

use nordic_aroma_core::CurrencyCode;

use super::CommandError;

/// Name, weight in grams, price in öre.
const DEMO_PRODUCTS: &[(&str, i64, i64)] = &[
    ("Lavendel eterisk olja 10ml", 50, 14_900),
    ("Eukalyptus eterisk olja 10ml", 50, 12_900),
    ("Pepparmynta eterisk olja 10ml", 50, 13_900),
    ("Tea tree eterisk olja 10ml", 50, 11_900),
    ("Citrongräs eterisk olja 10ml", 50, 12_500),
    ("Jojoba bärarolja 100ml", 150, 17_900),
    ("Ultraljudsdiffusor", 1_200, 44_950),
    ("Doftljus lavendel", 350, 19_900),
    ("Presentbox fyra oljor", 800, 39_900),
];

/// Insert the demo products.
///
/// # Errors
///
/// Returns [`CommandError`] if the database is unreachable or an insert
/// fails.
pub async fn products() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    for (name, weight_grams, price_ore) in DEMO_PRODUCTS {
        sqlx::query(
            "INSERT INTO products (name, weight_kg, price, currency) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(name)
        .bind(Decimal::new(*weight_grams, 3))
        .bind(Decimal::new(*price_ore, 2))
        .bind(CurrencyCode::SEK.code())
        .execute(&pool)
        .await?;
    }

    tracing::info!(count = DEMO_PRODUCTS.len(), "Demo products seeded");
    Ok(())
}
