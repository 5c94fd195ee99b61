use super::*;
use async_trait::async_trait;
use postback_config::HttpConfig;
use postback_protocols::{write_delta, Fragment, InvariantNumber};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::TransportError;

const SEARCH_PAGE: &str = r#"<html><body>
<form id="form1" method="post" action="Search.aspx">
  <input type="hidden" name="__VIEWSTATE" value="vs1">
  <input type="text" name="tbName" value="">
  <div id="up1"><span>no results</span></div>
</form>
<script>Sys.WebForms.PageRequestManager._initialize('sm1', 'form1', ['tup1','up1'], [], [], 90, '');</script>
</body></html>"#;

const LOGIN_PAGE: &str = r#"<html><body><form id="login"><input name="user"></form></body></html>"#;

fn delta(fragments: &[Fragment]) -> String {
    write_delta(fragments, LengthUnit::Utf16)
}

fn results_delta() -> String {
    delta(&[
        Fragment::Version {
            version: InvariantNumber::Integer(4),
        },
        Fragment::UpdatePanel {
            id: "up1".to_string(),
            html: "<table><tr><td>Dupont</td></tr></table>".to_string(),
        },
        Fragment::HiddenField {
            id: "__VIEWSTATE".to_string(),
            value: "vs2".to_string(),
        },
        Fragment::PageTitle {
            title: "Results".to_string(),
        },
    ])
}

async fn mount_search_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/Search.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .mount(server)
        .await;
}

async fn mount_delta(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/Search.aspx"))
        .and(header("X-MicrosoftAjax", "Delta=true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn session(config: SessionConfig) -> PostbackSession<ReqwestCollaborator> {
    let http = ReqwestCollaborator::from_config(&HttpConfig::default()).unwrap();
    PostbackSession::new(http, config, LengthUnit::Utf16)
}

async fn loaded_session(server: &MockServer, config: SessionConfig) -> PostbackSession<ReqwestCollaborator> {
    mount_search_page(server).await;
    let mut session = session(config);
    session
        .load(&format!("{}/Search.aspx", server.uri()))
        .await
        .unwrap();
    session
}

fn search() -> PostbackAction {
    PostbackAction::new("btnGo")
}

#[tokio::test]
async fn test_load_makes_session_ready() {
    let server = MockServer::start().await;
    let mut session = session(SessionConfig::default());
    assert_eq!(session.state(), SessionState::Idle);

    mount_search_page(&server).await;
    let outcome = session
        .load(&format!("{}/Search.aspx", server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome, PostbackOutcome::Loaded);
    assert_eq!(session.state(), SessionState::Ready);
    let page = session.page().unwrap();
    assert_eq!(page.script_manager_id(), Some("sm1"));
    assert_eq!(page.active_form_id(), Some("form1"));
    assert_eq!(session.get_control("__VIEWSTATE").unwrap(), "vs1");
}

#[tokio::test]
async fn test_controls_require_page() {
    let mut session = session(SessionConfig::default());
    assert!(matches!(session.get_control("a"), Err(PostbackError::NoPage)));
    assert!(matches!(session.set_control("a", "b"), Err(PostbackError::NoPage)));
}

#[tokio::test]
async fn test_load_rejects_invalid_url() {
    let mut session = session(SessionConfig::default());
    let err = session.load("not a url").await.unwrap_err();
    assert!(matches!(err, PostbackError::InvalidUrl { .. }));
}

#[tokio::test]
async fn test_postback_applies_delta() {
    let server = MockServer::start().await;
    let mut session = loaded_session(&server, SessionConfig::default()).await;

    Mock::given(method("POST"))
        .and(path("/Search.aspx"))
        .and(header("X-MicrosoftAjax", "Delta=true"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(header("Cache-Control", "no-cache"))
        .and(body_string_contains("__ASYNCPOST=true"))
        .and(body_string_contains("sm1=up1%7CbtnGo"))
        .and(body_string_contains("__EVENTTARGET=btnGo"))
        .and(body_string_contains("tbName=Dupont"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_delta()))
        .expect(1)
        .mount(&server)
        .await;

    session.set_control("tbName", "Dupont").unwrap();
    let outcome = session.postback(&search(), "up1|btnGo").await.unwrap();

    assert_eq!(outcome, PostbackOutcome::Updated);
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.get_control("__VIEWSTATE").unwrap(), "vs2");

    let page = session.page().unwrap();
    let panel = page.elements_by_id("up1").remove(0);
    let html = page.document().element(&panel).unwrap().inner_html();
    assert!(html.contains("Dupont"));
    assert!(!html.contains("no results"));

    let delta = session.last_delta().unwrap();
    assert_eq!(delta.page_title(), Some("Results"));
    assert!(delta.is_version4());
}

#[tokio::test]
async fn test_postback_protocol_error_faults_session() {
    let server = MockServer::start().await;
    let mut session = loaded_session(&server, SessionConfig::default()).await;
    mount_delta(
        &server,
        delta(&[Fragment::Error {
            code: InvariantNumber::Integer(500),
            message: "Invalid postback".to_string(),
        }]),
    )
    .await;

    let err = session.postback(&search(), "up1|btnGo").await.unwrap_err();

    assert!(matches!(
        err,
        PostbackError::Protocol { code: InvariantNumber::Integer(500), ref message } if message == "Invalid postback"
    ));
    assert_eq!(session.state(), SessionState::Faulted);
    assert!(matches!(session.get_control("tbName"), Err(PostbackError::Faulted)));
    assert!(matches!(
        session.postback(&search(), "up1|btnGo").await,
        Err(PostbackError::Faulted)
    ));

    session
        .load(&format!("{}/Search.aspx", server.uri()))
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_postback_framing_error_faults_session() {
    let server = MockServer::start().await;
    let mut session = loaded_session(&server, SessionConfig::default()).await;
    mount_delta(&server, "12|updatePanel|up1|short|".to_string()).await;

    let err = session.postback(&search(), "up1|btnGo").await.unwrap_err();

    assert!(matches!(err, PostbackError::Framing(_)));
    assert_eq!(session.state(), SessionState::Faulted);
}

#[tokio::test]
async fn test_postback_follows_redirect() {
    let server = MockServer::start().await;
    let mut session = loaded_session(&server, SessionConfig::default()).await;
    mount_delta(
        &server,
        delta(&[Fragment::PageRedirect {
            url: "/Login.aspx".to_string(),
        }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/Login.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = session.postback(&search(), "up1|btnGo").await.unwrap();

    assert_eq!(
        outcome,
        PostbackOutcome::Redirected {
            url: format!("{}/Login.aspx", server.uri())
        }
    );
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.page().unwrap().form().unwrap().id(), Some("login"));
}

#[tokio::test]
async fn test_postback_reports_redirect_without_following() {
    let server = MockServer::start().await;
    let config = SessionConfig {
        follow_redirects: false,
        ..SessionConfig::default()
    };
    let mut session = loaded_session(&server, config).await;
    mount_delta(
        &server,
        delta(&[Fragment::PageRedirect {
            url: "/Login.aspx".to_string(),
        }]),
    )
    .await;

    let outcome = session.postback(&search(), "up1|btnGo").await.unwrap();

    assert!(matches!(outcome, PostbackOutcome::Redirected { .. }));
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.page().unwrap().form().unwrap().id(), Some("form1"));
}

#[tokio::test]
async fn test_postback_requires_script_manager() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Login.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(&server)
        .await;

    let mut session = session(SessionConfig::default());
    session
        .load(&format!("{}/Login.aspx", server.uri()))
        .await
        .unwrap();

    let err = session.postback(&search(), "x").await.unwrap_err();
    assert!(matches!(err, PostbackError::MissingScriptManager));
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_submit_replaces_page() {
    let server = MockServer::start().await;
    let mut session = loaded_session(&server, SessionConfig::default()).await;

    Mock::given(method("POST"))
        .and(path("/Search.aspx"))
        .and(body_string_contains("__EVENTTARGET=&"))
        .and(body_string_contains("__VIEWSTATE=vs1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = session.submit(&PostbackAction::default()).await.unwrap();

    assert_eq!(outcome, PostbackOutcome::Loaded);
    let page = session.page().unwrap();
    assert_eq!(page.script_manager_id(), None);
    assert_eq!(page.form().unwrap().id(), Some("login"));
}

#[tokio::test]
async fn test_postback_dumps_updated_page() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig {
        responses_dir: Some(dir.path().join("responses")),
        ..SessionConfig::default()
    };
    let server = MockServer::start().await;
    let mut session = loaded_session(&server, config).await;
    mount_delta(&server, results_delta()).await;

    session.postback(&search(), "up1|btnGo").await.unwrap();
    session.postback(&search(), "up1|btnGo").await.unwrap();

    let first = std::fs::read_to_string(dir.path().join("responses/1-updated.html")).unwrap();
    assert!(first.contains("Dupont"));
    assert!(dir.path().join("responses/2-updated.html").exists());
}

struct FailingCollaborator;

#[async_trait]
impl HttpCollaborator for FailingCollaborator {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Timeout)
    }
}

#[tokio::test]
async fn test_transport_failure_faults_session() {
    let mut session = PostbackSession::new(
        FailingCollaborator,
        SessionConfig::default(),
        LengthUnit::Utf16,
    );

    let err = session.load("https://intranet.example.org/").await.unwrap_err();

    assert!(matches!(err, PostbackError::Transport(TransportError::Timeout)));
    assert_eq!(session.state(), SessionState::Faulted);
}

/// Serves the search page on GET and a fixed delta on POST.
struct ScriptedCollaborator {
    delta: String,
}

#[async_trait]
impl HttpCollaborator for ScriptedCollaborator {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = match request.method {
            postback_page::FormMethod::Get => SEARCH_PAGE.to_string(),
            postback_page::FormMethod::Post => self.delta.clone(),
        };
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            url: Url::parse("https://intranet.example.org/Search.aspx").unwrap(),
            body,
        })
    }
}

#[tokio::test]
async fn test_unparsable_redirect_faults_session() {
    let http = ScriptedCollaborator {
        delta: delta(&[Fragment::PageRedirect {
            url: "http://[bad".to_string(),
        }]),
    };
    let mut session = PostbackSession::new(http, SessionConfig::default(), LengthUnit::Utf16);
    session
        .load("https://intranet.example.org/Search.aspx")
        .await
        .unwrap();

    let err = session.postback(&search(), "up1|btnGo").await.unwrap_err();

    assert!(matches!(err, PostbackError::InvalidUrl { ref url, .. } if url == "http://[bad"));
    assert_eq!(session.state(), SessionState::Faulted);
}
