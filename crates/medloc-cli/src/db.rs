//! `db` subcommand handlers.

use std::path::Path;

pub(crate) async fn run_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    medloc_db::health_check(pool).await?;
    println!("database ok");
    Ok(())
}

pub(crate) async fn run_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = medloc_db::run_migrations(pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Load, validate, and upsert an inventory seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if any
/// database write fails. Nothing is written when validation fails.
pub(crate) async fn run_seed(pool: &sqlx::PgPool, file: &Path) -> anyhow::Result<()> {
    let seed = medloc_core::load_inventory_seed(file)?;
    let (stores, medicines) = medloc_db::seed_inventory(pool, &seed.stores).await?;

    tracing::info!(path = %file.display(), stores, medicines, "inventory seeded");
    println!("seeded {stores} store(s) and {medicines} medicine listing(s)");
    Ok(())
}
