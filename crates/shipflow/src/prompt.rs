//! Interactive prompts

use anyhow::Result;

/// Text prompt with a visible default; an empty answer takes the default.
pub fn text(label: &str, default: &str) -> Result<String> {
    let value = inquire::Text::new(label)
        .with_default(default)
        .prompt()?
        .trim()
        .to_string();
    if value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(value)
    }
}

/// Yes/no confirmation, defaulting to no.
pub fn confirm(label: &str) -> Result<bool> {
    Ok(inquire::Confirm::new(label).with_default(false).prompt()?)
}
