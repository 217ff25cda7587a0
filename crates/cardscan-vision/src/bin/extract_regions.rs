//! Dump the rank/suit crops and ink masks of a screenshot for inspection.
//! Usage: cargo run --features cli --bin extract_regions -- <screenshot.png> [output_dir] [data_dir]

use cardscan_capture::{crop_region, TableLayout};
use cardscan_data::DecisionTables;
use cardscan_vision::{CardReader, DecisionSequence, PixelMask};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [output_dir] [data_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_dir = PathBuf::from(args.get(2).map_or("./debug_output", String::as_str));
    let data_dir = PathBuf::from(args.get(3).map_or("./data", String::as_str));
    std::fs::create_dir_all(&output_dir)?;

    let layout = TableLayout::load_or_default(&data_dir)?;
    let tables = DecisionTables::load(&data_dir)?;

    println!("Loading image: {}", input_path.display());
    let img = cardscan_capture::load_screenshot(&input_path)?;
    println!("Image size: {}x{}", img.width(), img.height());

    let reader = CardReader::new(
        layout.clone(),
        DecisionSequence::from_probe_table(&tables.rank)?,
        DecisionSequence::from_probe_table(&tables.suit)?,
    );

    println!("\n=== Slots ===");
    for slot in 0..layout.slot_count() {
        let (Some(rank_area), Some(suit_area)) = (layout.rank_region(slot), layout.suit_region(slot))
        else {
            break;
        };
        let empty = reader.is_empty_slot(&img, slot);
        println!(
            "  Slot {}: rank x={} y={} suit x={} y={}{}",
            slot,
            rank_area.x,
            rank_area.y,
            suit_area.x,
            suit_area.y,
            if empty { " (empty)" } else { "" }
        );

        for (kind, area) in [("rank", rank_area), ("suit", suit_area)] {
            let crop = crop_region(&img, &area);
            let mask = PixelMask::from_rgba(&crop, layout.ink_threshold);
            crop.save(output_dir.join(format!("slot_{}_{}.png", slot, kind)))?;
            mask.to_image()
                .save(output_dir.join(format!("slot_{}_{}_mask.png", slot, kind)))?;
            println!("    {}: {} ink pixel(s)", kind, mask.ink_count());
        }
    }

    println!("\n=== Recognition ===");
    println!("Cards: {}", reader.read_hand(&img)?);

    println!("\nDebug images saved to: {}", output_dir.display());
    Ok(())
}
