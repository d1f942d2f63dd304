use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use fit28_core::models::ExportData;
use fit28_core::service::{Tracker, export_file_name};

pub(crate) async fn cmd_export(
    tracker: &Tracker,
    output: Option<PathBuf>,
    stdout: bool,
    json: bool,
) -> Result<()> {
    let data = tracker.export_all()?;
    let text = serde_json::to_string_pretty(&data)?;

    if stdout {
        println!("{text}");
        return Ok(());
    }

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
    tokio::fs::write(&path, &text)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "exported data");

    if json {
        println!(
            "{}",
            serde_json::json!({ "path": path.display().to_string(), "exportDate": data.export_date })
        );
    } else {
        println!("Exported to {}", path.display());
    }
    Ok(())
}

pub(crate) async fn cmd_import(
    tracker: &Tracker,
    file: &Path,
    replace: bool,
    json: bool,
) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let data: ExportData = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a fit28 export", file.display()))?;

    if replace {
        tracker.reset()?;
    }
    let summary = tracker.import_all(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Imported from {} (exported {})", file.display(), data.export_date);
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        println!("  Theme:         {}", yes_no(summary.theme));
        println!("  BMI:           {}", yes_no(summary.bmi));
        println!("  Goals:         {}", yes_no(summary.goals));
        println!("  Activities:    {}", summary.activities);
        println!("  Food entries:  {}", summary.food_entries);
        println!("  Gallery items: {}", summary.gallery_items);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit28_core::models::Theme;

    #[tokio::test]
    async fn test_export_file_then_import() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("backup.json");

        let source = Tracker::new_in_memory().unwrap();
        source.set_theme(Theme::Dark).unwrap();
        source.record_bmi(Some(165.0), Some(58.0)).unwrap();
        cmd_export(&source, Some(path.clone()), false, true).await.unwrap();

        let target = Tracker::new_in_memory().unwrap();
        cmd_import(&target, &path, false, true).await.unwrap();
        assert_eq!(target.theme().unwrap(), Theme::Dark);
        assert!(target.bmi().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_import_rejects_foreign_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("other.json");
        std::fs::write(&path, r#"{"foods": []}"#).unwrap();

        let tracker = Tracker::new_in_memory().unwrap();
        let err = cmd_import(&tracker, &path, false, true).await.unwrap_err();
        assert!(format!("{err:#}").contains("is not a fit28 export"));
    }
}
