use anyhow::{Context, Result};

use super::DeckMeta;

/// Separate a leading `---` delimited YAML block from the body.
///
/// Input without a closed frontmatter block is returned whole as the body.
pub fn extract(content: &str) -> Result<(DeckMeta, String)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();

    if lines.next().map(str::trim) != Some("---") {
        return Ok((DeckMeta::default(), content.to_string()));
    }

    let mut yaml = Vec::new();
    for line in lines.by_ref() {
        if line.trim() == "---" {
            let yaml = yaml.join("\n");
            let meta = if yaml.trim().is_empty() {
                DeckMeta::default()
            } else {
                serde_yaml::from_str(&yaml).context("Invalid frontmatter")?
            };
            let body = lines.collect::<Vec<_>>().join("\n");
            return Ok((meta, body));
        }
        yaml.push(line);
    }

    Ok((DeckMeta::default(), content.to_string()))
}
