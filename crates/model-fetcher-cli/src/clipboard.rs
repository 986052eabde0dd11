//! Copying model ids to the system clipboard.

use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;

use model_fetcher_core::ModelRecord;

/// Text to copy: the one chosen id, or every shown id one per line.
pub fn selection(shown: &[&ModelRecord], choice: Option<&str>) -> Result<String> {
    match choice {
        Some(id) => shown
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.id.clone())
            .ok_or_else(|| anyhow!("model {:?} is not in the list", id)),
        None if shown.is_empty() => Err(anyhow!("no model ids to copy")),
        None => Ok(shown
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("can't access clipboard")?;
    clipboard
        .set_text(text)
        .context("failed to write to clipboard")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection() {
        let models = vec![ModelRecord::new("gpt-4"), ModelRecord::new("gpt-3.5")];
        let shown: Vec<&ModelRecord> = models.iter().collect();

        assert_eq!(selection(&shown, None).unwrap(), "gpt-4\ngpt-3.5");
        assert_eq!(selection(&shown, Some("gpt-3.5")).unwrap(), "gpt-3.5");
        assert!(selection(&shown, Some("gpt-5")).is_err());
        assert!(selection(&[], None).is_err());
    }
}
