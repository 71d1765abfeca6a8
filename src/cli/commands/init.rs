//! Init command.

use console::style;

use crate::config::Settings;
use crate::repository::AuditRepository;

pub(super) fn run(settings: &Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(&settings.storage.data_dir)?;
    AuditRepository::new(&settings.database.path)?;

    println!(
        "{} Data directory at {}",
        style("✓").green(),
        settings.storage.data_dir.display()
    );
    println!(
        "{} Audit database at {}",
        style("✓").green(),
        settings.database.path.display()
    );
    Ok(())
}
