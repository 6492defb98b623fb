//! `masdev open` and `masdev menu` commands.

use std::io::Write;

use anyhow::{Context, Result};

use masdev_core::navigation::{DimensionView, UrlOpener, menu_entries, open_view};

/// Opens URLs in the system browser.
pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

/// Run the open command.
pub fn run_open(view: DimensionView, opener: &dyn UrlOpener) -> Result<()> {
    let url = open_view(view, opener)
        .with_context(|| format!("failed to open {} at {}", view.label(), view.url()))?;
    println!("Opened {} at {url}", view.label());
    Ok(())
}

/// Print the command menu as `label  command` rows.
pub fn run_menu(out: &mut dyn Write) -> Result<()> {
    let entries = menu_entries();
    let width = entries.iter().map(|e| e.label.len()).max().unwrap_or(0);
    for entry in entries {
        writeln!(
            out,
            "{:<width$}  {}",
            entry.label,
            entry.command.invocation()
        )?;
    }
    Ok(())
}
