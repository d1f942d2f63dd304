use std::process;

use anyhow::Result;
use tabled::{Table, Tabled, settings::Style};

use fit28_core::gallery::GalleryFilter;
use fit28_core::service::Tracker;

use super::helpers::truncate;

pub(crate) fn cmd_gallery(tracker: &Tracker, kind: &str, week: &str, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct GalleryRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "Description")]
        description: String,
        #[tabled(rename = "Week")]
        week: u8,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Size")]
        size: String,
    }

    let filter = GalleryFilter::parse(kind, week)?;
    let items = tracker.gallery(&filter)?;

    if items.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No photos match type '{kind}' and week '{week}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let rows: Vec<GalleryRow> = items
        .iter()
        .enumerate()
        .map(|(i, item)| GalleryRow {
            idx: i + 1,
            kind: item.kind.to_string(),
            description: truncate(&item.description, 40),
            week: item.week.index(),
            date: item.date.get(..10).unwrap_or(&item.date).to_string(),
            size: format!("{} KB", item.photo.len().div_ceil(1024)),
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
