use axum::{
    extract::{Form, Json, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::entity::{Doc, EntitySpan};
use crate::error::NerError;
use crate::pipeline::{self, Pipeline};
use crate::render::{escape_html, render_entities};

pub const TARGET_WEB_REQUEST: &str = "web_request";

pub const EMPTY_INPUT_WARNING: &str = "Please enter some text to analyze.";
pub const NO_ENTITIES_WARNING: &str = "No entities found in the text.";

/// Shared state: the pipeline and a lock that admits one submission at a time.
pub struct AppState {
    pipeline: Arc<Pipeline>,
    busy: Mutex<()>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Arc<Self> {
        Arc::new(Self {
            pipeline,
            busy: Mutex::new(()),
        })
    }

    /// State over the process-wide pipeline installed with [`pipeline::init_global`].
    pub fn from_global() -> Result<Arc<Self>, NerError> {
        Ok(Self::new(pipeline::global()?))
    }
}

/// Form and JSON request body.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityItem {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl From<&EntitySpan> for EntityItem {
    fn from(span: &EntitySpan) -> Self {
        EntityItem {
            text: span.text.clone(),
            label: span.label.to_string(),
            start: span.start,
            end: span.end,
        }
    }
}

/// Outcome of one submission. `html` is absent when nothing was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub html: Option<String>,
    pub entities: Vec<EntityItem>,
    pub warning: Option<String>,
}

impl Analysis {
    fn empty_input() -> Self {
        Analysis {
            html: None,
            entities: Vec::new(),
            warning: Some(EMPTY_INPUT_WARNING.to_string()),
        }
    }

    fn from_doc(doc: &Doc) -> Self {
        Analysis {
            html: Some(render_entities(doc)),
            entities: doc.ents.iter().map(EntityItem::from).collect(),
            warning: (!doc.has_entities()).then(|| NO_ENTITIES_WARNING.to_string()),
        }
    }
}

/// Run one submission through the pipeline.
///
/// Blank input returns a warning without touching the pipeline.
pub async fn analyze(state: &AppState, text: String) -> Result<Analysis, NerError> {
    if text.trim().is_empty() {
        info!(target: TARGET_WEB_REQUEST, "Rejected empty submission");
        return Ok(Analysis::empty_input());
    }

    let _guard = state.busy.lock().await;
    let pipeline = Arc::clone(&state.pipeline);
    let doc = tokio::task::spawn_blocking(move || pipeline.process(&text))
        .await
        .map_err(|e| NerError::Model(format!("Inference task failed: {}", e)))??;

    info!(
        target: TARGET_WEB_REQUEST,
        "Analyzed {} bytes, found {} entities",
        doc.text.len(),
        doc.ents.len()
    );
    Ok(Analysis::from_doc(&doc))
}

fn internal_error(e: NerError) -> (StatusCode, String) {
    error!(target: TARGET_WEB_REQUEST, "Analysis failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

async fn index() -> Html<String> {
    Html(render_page("", None))
}

async fn analyze_form(
    State(state): State<Arc<AppState>>,
    Form(request): Form<AnalyzeRequest>,
) -> Result<Html<String>, (StatusCode, String)> {
    let analysis = analyze(&state, request.text.clone())
        .await
        .map_err(internal_error)?;
    Ok(Html(render_page(&request.text, Some(&analysis))))
}

async fn analyze_json(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Analysis>, (StatusCode, String)> {
    analyze(&state, request.text)
        .await
        .map(Json)
        .map_err(internal_error)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze_form))
        .route("/api/analyze", post(analyze_json))
        .with_state(state)
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(target: TARGET_WEB_REQUEST, "Server running on http://{}", addr);
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

const PAGE_STYLE: &str = r#"
body { background-color: #0e1117; color: #ffffff; font-family: 'Segoe UI', sans-serif; margin: 0; }
main { max-width: 960px; margin: 0 auto; padding: 32px 16px; }
.title { text-align: center; font-size: 40px; font-weight: 700; margin-bottom: 0; }
.subtitle { text-align: center; color: #9aa0a6; font-size: 18px; margin-bottom: 40px; }
textarea { width: 100%; height: 180px; background-color: #1e1e1e; color: #ffffff; font-size: 16px; border-radius: 10px; padding: 12px; box-sizing: border-box; }
.actions { text-align: center; margin: 16px 0; }
button { font-size: 16px; padding: 8px 24px; border-radius: 8px; cursor: pointer; }
.warning { background-color: #3d3a1e; color: #ffe08a; padding: 12px 16px; border-radius: 10px; margin: 16px 0; }
.highlighted { background-color: #111; border-radius: 10px; padding: 15px; }
.entity { background-color: #1e293b; padding: 8px 12px; border-radius: 10px; margin: 4px 0; }
"#;

/// Full page: the form, then the results of `analysis` when present.
pub fn render_page(text: &str, analysis: Option<&Analysis>) -> String {
    let mut body = format!(
        r#"<h1 class="title">Named Entity Recognition</h1>
<p class="subtitle">Highlighting people, organizations, locations, and more</p>
<form method="post" action="/analyze">
<label for="text">Enter your text below</label>
<textarea id="text" name="text">{}</textarea>
<div class="actions"><button type="submit">Analyze Text</button></div>
</form>"#,
        escape_html(text)
    );

    if let Some(analysis) = analysis {
        if let Some(html) = &analysis.html {
            body.push_str("<hr><h2>Entities Highlighted in Text</h2>");
            body.push_str(&format!(r#"<div class="highlighted">{}</div>"#, html));
        }

        if let Some(warning) = &analysis.warning {
            body.push_str(&format!(
                r#"<div class="warning">{}</div>"#,
                escape_html(warning)
            ));
        } else {
            body.push_str("<h2>Extracted Entities</h2>");
            for item in &analysis.entities {
                body.push_str(&format!(
                    r#"<div class="entity"><b>{}</b> &rarr; <code>{}</code></div>"#,
                    escape_html(&item.text),
                    escape_html(&item.label)
                ));
            }
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>NER Visualizer</title><style>{}</style></head>
<body><main>{}</main></body>
</html>"#,
        PAGE_STYLE, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityRuler, RuleSet};

    fn state() -> Arc<AppState> {
        let ruler = EntityRuler::new(&RuleSet::Ai.rules()).unwrap();
        AppState::new(Arc::new(Pipeline::ruler_only(ruler)))
    }

    #[tokio::test]
    async fn test_empty_input_warns_without_entities() {
        let state = state();
        for text in ["", "   \n\t"] {
            let analysis = analyze(&state, text.to_string()).await.unwrap();
            assert_eq!(analysis.warning.as_deref(), Some(EMPTY_INPUT_WARNING));
            assert!(analysis.entities.is_empty());
            assert!(analysis.html.is_none());
        }
    }

    #[tokio::test]
    async fn test_no_entities_warns_but_still_renders() {
        let analysis = analyze(&state(), "the weather is nice".to_string())
            .await
            .unwrap();
        assert_eq!(analysis.warning.as_deref(), Some(NO_ENTITIES_WARNING));
        assert!(analysis.html.is_some());
    }

    #[tokio::test]
    async fn test_entities_are_listed_in_order() {
        let analysis = analyze(&state(), "Elon Musk left OpenAI".to_string())
            .await
            .unwrap();
        assert!(analysis.warning.is_none());
        let labels: Vec<(&str, &str)> = analysis
            .entities
            .iter()
            .map(|e| (e.text.as_str(), e.label.as_str()))
            .collect();
        assert_eq!(labels, vec![("Elon Musk", "PERSON"), ("OpenAI", "ORG")]);
    }

    #[tokio::test]
    async fn test_form_handler_renders_page() {
        let Html(page) = analyze_form(
            State(state()),
            Form(AnalyzeRequest {
                text: "ChatGPT <3".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(page.contains("Extracted Entities"));
        assert!(page.contains("<b>ChatGPT</b> &rarr; <code>PRODUCT</code>"));
        assert!(page.contains("<textarea id=\"text\" name=\"text\">ChatGPT &lt;3</textarea>"));
    }

    #[tokio::test]
    async fn test_json_handler_reports_empty_warning() {
        let Json(analysis) = analyze_json(
            State(state()),
            Json(AnalyzeRequest {
                text: String::new(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(analysis.warning.as_deref(), Some(EMPTY_INPUT_WARNING));
    }

    #[tokio::test]
    async fn test_state_uses_global_pipeline() {
        let _ = pipeline::init_global(Pipeline::ruler_only(EntityRuler::default()));
        let state = AppState::from_global().unwrap();
        assert!(Arc::ptr_eq(&state.pipeline, &pipeline::global().unwrap()));

        let analysis = analyze(&state, "Tesla".to_string()).await.unwrap();
        assert!(analysis.html.is_some());
    }

    #[test]
    fn test_blank_page_has_form_only() {
        let page = render_page("", None);
        assert!(page.contains("Analyze Text"));
        assert!(!page.contains("class=\"warning\""));
    }
}
