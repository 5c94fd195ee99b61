//! `run` subcommand: one load/set/postback cycle against a live site.

use std::path::PathBuf;

use anyhow::Context;
use postback_client::{PostbackOutcome, PostbackSession};
use postback_config::Config;
use postback_page::PostbackAction;
use serde_json::json;
use tracing::info;

pub(crate) struct RunArgs {
    pub url: String,
    pub assignments: Vec<(String, String)>,
    pub target: String,
    pub argument: String,
    pub scriptmanager: Option<String>,
    pub button: Option<String>,
    pub no_submit: bool,
    pub reads: Vec<String>,
    pub save_html: Option<PathBuf>,
}

pub(crate) async fn handle_run_command(config: &Config, args: RunArgs) -> anyhow::Result<()> {
    let mut session = PostbackSession::from_config(config)?;

    session.load(&args.url).await?;

    for (name, value) in &args.assignments {
        session
            .set_control(name, value)
            .with_context(|| format!("Failed to set {}", name))?;
    }

    let mut action = PostbackAction::new(args.target.as_str()).with_argument(args.argument.as_str());
    if let Some(button) = &args.button {
        action = action.with_button(button.as_str());
    }

    let outcome = if args.no_submit {
        PostbackOutcome::Loaded
    } else if let Some(scriptmanager) = &args.scriptmanager {
        session.postback(&action, scriptmanager).await?
    } else {
        session.submit(&action).await?
    };
    info!(outcome = ?outcome, "Interaction complete");

    let mut values = serde_json::Map::new();
    for name in &args.reads {
        values.insert(name.clone(), json!(session.get_control(name)?));
    }

    let page = session.page();
    if let (Some(path), Some(page)) = (&args.save_html, page) {
        std::fs::write(path, page.to_html())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let report = json!({
        "outcome": outcome,
        "state": session.state(),
        "url": page.and_then(|p| p.url()).map(|u| u.as_str()),
        "values": values,
        "page_title": session.last_delta().and_then(|d| d.page_title()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postback_protocols::{write_delta, Fragment, LengthUnit};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body><form id="f1" action="Page.aspx">
<input type="text" name="tbName" value="">
<div id="upMain">old</div>
</form>
<script>Sys.WebForms.PageRequestManager._initialize('sm', 'f1', [], [], [], 90, '');</script>
</body></html>"#;

    fn args(url: String, save_html: Option<PathBuf>) -> RunArgs {
        RunArgs {
            url,
            assignments: vec![("tbName".to_string(), "Dupont".to_string())],
            target: "btnSearch".to_string(),
            argument: String::new(),
            scriptmanager: Some("upMain|btnSearch".to_string()),
            button: None,
            no_submit: false,
            reads: vec!["tbName".to_string()],
            save_html,
        }
    }

    #[tokio::test]
    async fn test_run_partial_postback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Page.aspx"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let delta = write_delta(
            &[Fragment::UpdatePanel {
                id: "upMain".to_string(),
                html: "<b>found</b>".to_string(),
            }],
            LengthUnit::Utf16,
        );
        Mock::given(method("POST"))
            .and(path("/Page.aspx"))
            .and(header("X-MicrosoftAjax", "Delta=true"))
            .and(body_string_contains("tbName=Dupont"))
            .respond_with(ResponseTemplate::new(200).set_body_string(delta))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let saved = dir.path().join("page.html");
        let url = format!("{}/Page.aspx", server.uri());

        handle_run_command(&Config::default(), args(url, Some(saved.clone())))
            .await
            .unwrap();

        let html = std::fs::read_to_string(saved).unwrap();
        assert!(html.contains("<b>found</b>"));
    }

    #[tokio::test]
    async fn test_run_unknown_read_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let mut run = args(format!("{}/Page.aspx", server.uri()), None);
        run.no_submit = true;
        run.reads = vec!["missing".to_string()];

        let err = handle_run_command(&Config::default(), run).await.unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
