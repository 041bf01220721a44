use actix_web::{
    error::JsonPayloadError, http::StatusCode, web, HttpRequest, HttpResponse, ResponseError,
};
use fellowcraft_rag::{
    error::{Error, ErrorKind},
    rag::RagService,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Largest `/rag` body accepted. Far above any query the embedding models can
/// use; bigger bodies are refused without reading them.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Body of `POST /rag`.
#[derive(Debug, Deserialize)]
pub struct RagRequest {
    #[serde(default)]
    query: Option<String>,
}

impl RagRequest {
    /// A missing or empty `query` is rejected here, before any model is called.
    fn into_query(self) -> Result<String, ApiError> {
        match self.query {
            Some(query) if !query.is_empty() => Ok(query),
            _ => Err(ApiError::InvalidRequest),
        }
    }
}

#[derive(Debug, Serialize)]
struct RagResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    documents: usize,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No query provided")]
    InvalidRequest,
    #[error("Error processing query")]
    DependencyFailure(#[source] Error),
    #[error("Error processing query")]
    BodyTooLarge,
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        match value.kind() {
            ErrorKind::InvalidRequest => ApiError::InvalidRequest,
            ErrorKind::DependencyFailure => ApiError::DependencyFailure(value),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiError::DependencyFailure(_) | ApiError::BodyTooLarge => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

/// Unparsable bodies are reported the same way as a missing query. An
/// oversized body may still hold a valid query, so it is not.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            error!("Rejected /rag body: {err}");
            ApiError::BodyTooLarge.into()
        }
        _ => {
            warn!("Rejected /rag body: {err}");
            ApiError::InvalidRequest.into()
        }
    }
}

async fn rag(
    service: web::Data<RagService>,
    body: web::Json<RagRequest>,
) -> Result<HttpResponse, ApiError> {
    let query = body.into_inner().into_query()?;
    info!(query_len = query.len(), "Received RAG query");
    debug!(query = %query);

    let answer = service.answer(&query).await.map_err(|e| {
        if e.kind() == ErrorKind::DependencyFailure {
            error!("RAG query failed: {e}");
        }
        ApiError::from(e)
    })?;
    info!(
        document_id = answer.document_id,
        response_len = answer.response.len(),
        "Answered RAG query"
    );

    Ok(HttpResponse::Ok().json(RagResponse {
        response: answer.response,
    }))
}

async fn health(service: web::Data<RagService>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        documents: service.documents().len(),
    })
}

/// Registers the routes. The `RagService` itself is expected as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .content_type_required(false)
            .limit(MAX_BODY_BYTES)
            .error_handler(json_error_handler),
    )
    .route("/rag", web::post().to(rag))
    .route("/health", web::get().to(health));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use fellowcraft_rag::{
        completion::{CompletionError, CompletionModel, GenerationParams},
        document::{builtin_corpus, FELLOWCRAFT_DOCUMENTS},
        embeddings::{model::EmbeddingModel, EmbedderError},
        rag::RagSettings,
    };
    use serde_json::{json, Value};

    fn words(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
    }

    /// Word counts over the corpus vocabulary; words outside it are ignored.
    struct VocabularyEmbedding {
        vocabulary: Vec<String>,
    }

    impl VocabularyEmbedding {
        fn new() -> Self {
            let mut vocabulary: Vec<String> = FELLOWCRAFT_DOCUMENTS
                .iter()
                .flat_map(|doc| words(doc).collect::<Vec<_>>())
                .collect();
            vocabulary.sort();
            vocabulary.dedup();
            Self { vocabulary }
        }
    }

    #[async_trait]
    impl EmbeddingModel for VocabularyEmbedding {
        async fn embed(&self, data: &str) -> Result<Vec<f64>, EmbedderError> {
            let mut vector = vec![0.0; self.vocabulary.len()];
            for word in words(data) {
                if let Ok(i) = self.vocabulary.binary_search(&word) {
                    vector[i] += 1.0;
                }
            }
            Ok(vector)
        }
    }

    /// Greedy stand-in: the continuation depends only on the prompt.
    struct EchoCompletion;

    #[async_trait]
    impl CompletionModel for EchoCompletion {
        async fn complete(
            &self,
            prompt: &str,
            params: &GenerationParams,
        ) -> Result<String, CompletionError> {
            Ok(format!(" ({} chars, max {})", prompt.len(), params.max_tokens))
        }
    }

    struct UnavailableCompletion;

    #[async_trait]
    impl CompletionModel for UnavailableCompletion {
        async fn complete(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, CompletionError> {
            Err(CompletionError::RequestError("connection refused".to_string()))
        }
    }

    async fn rag_service(completion_model: Box<dyn CompletionModel>) -> web::Data<RagService> {
        let service = RagService::init(
            builtin_corpus(),
            Box::new(VocabularyEmbedding::new()),
            completion_model,
            RagSettings::default(),
        )
        .await
        .unwrap();
        web::Data::new(service)
    }

    async fn post_rag(
        service: web::Data<RagService>,
        body: test::TestRequest,
    ) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(service).configure(configure)).await;
        let resp = test::call_service(&app, body.uri("/rag").to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_answers_with_context_from_matching_document() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let (status, body) = post_rag(
            service,
            test::TestRequest::post().set_json(json!({"query": "What does the RAG service do?"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = body["response"].as_str().unwrap();
        let expected_prompt = format!(
            "Context: {}\nQuery: What does the RAG service do?\nAnswer:",
            FELLOWCRAFT_DOCUMENTS[4]
        );
        assert!(response.starts_with(&expected_prompt));
        assert!(response.ends_with("max 100)"));
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_repeated_queries_get_identical_answers() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let app = test::init_service(App::new().app_data(service).configure(configure)).await;

        let mut answers = vec![];
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/rag")
                .set_json(json!({"query": "Where are query logs stored?"}))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            answers.push(body);
        }
        assert_eq!(answers[0], answers[1]);
        assert_eq!(answers[1], answers[2]);
        assert!(answers[0]["response"]
            .as_str()
            .unwrap()
            .contains(FELLOWCRAFT_DOCUMENTS[5]));
    }

    #[actix_web::test]
    async fn test_missing_or_empty_query_is_bad_request() {
        for payload in [json!({}), json!({"query": ""}), json!({"query": null})] {
            let service = rag_service(Box::new(EchoCompletion)).await;
            let (status, body) =
                post_rag(service, test::TestRequest::post().set_json(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "No query provided"}));
        }
    }

    #[actix_web::test]
    async fn test_malformed_body_is_bad_request() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let (status, body) =
            post_rag(service, test::TestRequest::post().set_payload("query=hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No query provided"}));

        let service = rag_service(Box::new(EchoCompletion)).await;
        let (status, _) =
            post_rag(service, test::TestRequest::post().set_json(json!({"query": 42}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_body_without_json_content_type_is_accepted() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let (status, body) = post_rag(
            service,
            test::TestRequest::post().set_payload(r#"{"query": "hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].is_string());
    }

    #[actix_web::test]
    async fn test_generator_failure_is_server_error() {
        let service = rag_service(Box::new(UnavailableCompletion)).await;
        let (status, body) = post_rag(
            service,
            test::TestRequest::post().set_json(json!({"query": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error processing query"}));
    }

    #[actix_web::test]
    async fn test_long_query_is_answered() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let query = "lessons ".repeat(300_000);
        let (status, body) = post_rag(
            service,
            test::TestRequest::post().set_json(json!({ "query": query })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains(&query));
    }

    #[actix_web::test]
    async fn test_body_over_limit_is_not_reported_as_missing_query() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let query = "lessons ".repeat(MAX_BODY_BYTES / 8 + 1);
        let (status, body) = post_rag(
            service,
            test::TestRequest::post().set_json(json!({ "query": query })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error processing query"}));
    }

    #[actix_web::test]
    async fn test_health_reports_corpus_size() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let app = test::init_service(App::new().app_data(service).configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"status": "ok", "documents": 6}));
    }

    #[actix_web::test]
    async fn test_requests_leave_index_unchanged() {
        let service = rag_service(Box::new(EchoCompletion)).await;
        let index_before = service.index().clone();
        let app =
            test::init_service(App::new().app_data(service.clone()).configure(configure)).await;

        for query in ["hello", "What does the RAG service do?", "lessons"] {
            let req = test::TestRequest::post()
                .uri("/rag")
                .set_json(json!({ "query": query }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
        }
        assert_eq!(service.index(), &index_before);
        assert_eq!(service.documents(), builtin_corpus().as_slice());
    }
}
