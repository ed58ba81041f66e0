mod modules;

use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    let db = bookshelf_db::Db::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| "failed to open database")?;

    for (module, migration) in registry.collect_migrations() {
        db.apply_migration(&module, migration.id, migration.up)
            .await?;
    }

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    bookshelf_http::start_server(&registry, &db, &settings).await?;

    registry.stop_all().await?;
    db.close().await;

    tracing::info!("bookshelf shutdown complete");
    Ok(())
}
