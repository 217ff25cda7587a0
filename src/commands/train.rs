use anyhow::Result;
use cardscan_capture::TableLayout;
use cardscan_data::ProbeTable;
use cardscan_vision::TrainingSet;
use std::path::Path;
use tracing::info;

use super::TEMPLATES_DIR;

/// Learn probe tables from labeled screenshots, print them and save them
/// into the data directory.
pub fn train(samples: &Path, data_dir: &Path, prefer_runs: bool) -> Result<()> {
    let layout = TableLayout::load_or_default(data_dir)?;
    let set = TrainingSet::from_dir(samples, layout)?;
    let tables = set.train(prefer_runs)?;

    print_table("Suits", &tables.suit);
    println!();
    print_table("Ranks", &tables.rank);

    tables.save(data_dir)
}

/// Build averaged rank/suit templates from labeled screenshots
pub fn build_templates(samples: &Path, data_dir: &Path) -> Result<()> {
    let layout = TableLayout::load_or_default(data_dir)?;
    let set = TrainingSet::from_dir(samples, layout)?;
    let (ranks, suits) = set.templates();

    let dir = data_dir.join(TEMPLATES_DIR);
    ranks.save(&dir.join("ranks"))?;
    suits.save(&dir.join("suits"))?;
    info!(
        "Wrote {} rank and {} suit template(s) to {}",
        ranks.template_count(),
        suits.template_count(),
        dir.display()
    );
    Ok(())
}

fn print_table(title: &str, table: &ProbeTable) {
    println!("{} ({}x{}):", title, table.width, table.height);
    for probe in &table.probes {
        println!("{}, ({}, {})", probe.label, probe.x, probe.y);
    }
}
