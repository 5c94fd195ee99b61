//! `parse` subcommand: decode a captured delta response.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use postback_protocols::{write_delta, DeltaResponse, LengthUnit};
use serde_json::json;

pub(crate) fn handle_parse_command(input: &Path, unit: LengthUnit, reencode: bool) -> anyhow::Result<()> {
    let text = read_input(input)?;
    println!("{}", render(&text, unit, reencode)?);
    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
    }
}

pub(crate) fn render(text: &str, unit: LengthUnit, reencode: bool) -> anyhow::Result<String> {
    let response = DeltaResponse::parse(text, unit)?;

    if reencode {
        return Ok(write_delta(response.fragments(), unit));
    }

    let summary = json!({
        "version": response.version(),
        "error": response.error_code().map(|code| json!({
            "code": code,
            "message": response.error_message(),
        })),
        "redirect_url": response.redirect_url(),
        "page_title": response.page_title(),
        "focus": response.focus(),
        "form_action": response.form_action(),
        "script_blocks": response.script_blocks(),
        "fragments": response.fragments(),
    });

    Ok(serde_json::to_string_pretty(&summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1|#||4|15|updatePanel|panelA|<span>hi</span>|3|hiddenField|__VIEWSTATE|abc|5|pageTitle||Hello|\r\n";

    #[test]
    fn test_render_json_summary() {
        let rendered = render(SAMPLE, LengthUnit::Utf16, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["version"], 4);
        assert_eq!(value["page_title"], "Hello");
        assert!(value["error"].is_null());
        let fragments = value["fragments"].as_array().unwrap();
        assert_eq!(fragments.len(), 4);
        assert_eq!(fragments[1]["type"], "updatePanel");
        assert_eq!(fragments[1]["id"], "panelA");
    }

    #[test]
    fn test_render_reencode() {
        let rendered = render(SAMPLE, LengthUnit::Utf16, true).unwrap();
        assert_eq!(rendered, SAMPLE.trim_end());
    }

    #[test]
    fn test_render_framing_error() {
        let err = render("10|updatePanel|x|short|", LengthUnit::Utf16, false).unwrap_err();
        assert!(err.to_string().contains("Framing error"));
    }

    #[test]
    fn test_read_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delta.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(read_input(&path).unwrap(), SAMPLE);
        assert!(read_input(&dir.path().join("missing.txt")).is_err());
    }
}
