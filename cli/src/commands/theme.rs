use anyhow::Result;

use fit28_core::models::Theme;
use fit28_core::service::Tracker;

fn print_theme(theme: Theme, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "theme": theme }));
    } else {
        println!("Theme: {theme}");
    }
}

pub(crate) fn cmd_theme_show(tracker: &Tracker, json: bool) -> Result<()> {
    print_theme(tracker.theme()?, json);
    Ok(())
}

pub(crate) fn cmd_theme_set(tracker: &Tracker, theme: &str, json: bool) -> Result<()> {
    let theme = tracker.set_theme(theme.parse()?)?;
    print_theme(theme, json);
    Ok(())
}

pub(crate) fn cmd_theme_toggle(tracker: &Tracker, json: bool) -> Result<()> {
    print_theme(tracker.toggle_theme()?, json);
    Ok(())
}
