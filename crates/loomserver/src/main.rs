use actix_cors::Cors;
use actix_web::{
    delete, get, post, put, web, App, HttpRequest, HttpResponse, HttpServer, Responder,
    Result as ActixResult,
};
use actix_ws::Message;
use loomcore::{EngineError, WorkflowDefinition};
use loomnodes::{HttpCompletionClient, HttpToolClient};
use loomruntime::{
    validate, MemoryExecutionStore, MemoryWorkflowStore, Principal, WorkflowEngine,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Application state shared across handlers.
struct AppState {
    engine: Arc<WorkflowEngine>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidationResponse {
    valid: bool,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Principal comes from upstream auth; only the ids reach this service.
fn principal_from(req: &HttpRequest) -> Principal {
    let user_id = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok());

    let organization_ids = req
        .headers()
        .get_all("x-org-id")
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Uuid::parse_str(v).ok())
        .collect();

    Principal {
        user_id,
        organization_ids,
    }
}

fn error_response(err: EngineError) -> HttpResponse {
    match err {
        EngineError::Validation { errors } => {
            HttpResponse::UnprocessableEntity().json(ValidationResponse {
                valid: false,
                errors: errors.iter().map(|e| e.to_string()).collect(),
            })
        }
        EngineError::WorkflowNotFound(_) | EngineError::ExecutionNotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse {
                error: err.to_string(),
            })
        }
        EngineError::AccessDenied(_) => HttpResponse::Forbidden().json(ErrorResponse {
            error: err.to_string(),
        }),
        other => {
            error!("request failed: {other}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: other.to_string(),
            })
        }
    }
}

#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "loomserver"
    }))
}

/// Validate a definition without persisting it.
#[post("/api/workflows/validate")]
async fn validate_workflow(definition: web::Json<WorkflowDefinition>) -> impl Responder {
    let report = validate(&definition);
    HttpResponse::Ok().json(ValidationResponse {
        valid: report.is_valid(),
        errors: report.messages(),
    })
}

#[post("/api/workflows")]
async fn create_workflow(
    data: web::Data<AppState>,
    definition: web::Json<WorkflowDefinition>,
) -> ActixResult<impl Responder> {
    let definition = definition.into_inner();
    info!("creating workflow: {} ({})", definition.name, definition.id);

    match data.engine.create_workflow(definition).await {
        Ok(created) => Ok(HttpResponse::Created().json(created)),
        Err(err) => Ok(error_response(err)),
    }
}

#[get("/api/workflows")]
async fn list_workflows(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> ActixResult<impl Responder> {
    let principal = principal_from(&req);
    match data
        .engine
        .list_workflows(query.category.as_deref(), &principal)
        .await
    {
        Ok(definitions) => Ok(HttpResponse::Ok().json(definitions)),
        Err(err) => Ok(error_response(err)),
    }
}

#[get("/api/workflows/{id}")]
async fn get_workflow(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let principal = principal_from(&req);
    match data.engine.get_workflow(path.into_inner(), &principal).await {
        Ok(definition) => Ok(HttpResponse::Ok().json(definition)),
        Err(err) => Ok(error_response(err)),
    }
}

/// Full replace; the body is revalidated before the old definition is
/// touched.
#[put("/api/workflows/{id}")]
async fn update_workflow(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    definition: web::Json<WorkflowDefinition>,
) -> ActixResult<impl Responder> {
    let principal = principal_from(&req);
    let mut definition = definition.into_inner();
    definition.id = path.into_inner();

    match data.engine.update_workflow(definition, &principal).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(updated)),
        Err(err) => Ok(error_response(err)),
    }
}

#[delete("/api/workflows/{id}")]
async fn delete_workflow(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let principal = principal_from(&req);
    let workflow_id = path.into_inner();

    match data.engine.delete_workflow(workflow_id, &principal).await {
        Ok(()) => {
            info!("deleted workflow: {workflow_id}");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "workflow deleted"
            })))
        }
        Err(err) => Ok(error_response(err)),
    }
}

#[post("/api/workflows/{id}/execute")]
async fn execute_workflow(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let principal = principal_from(&req);
    let workflow_id = path.into_inner();
    info!("executing workflow: {workflow_id}");

    match data.engine.execute_workflow(workflow_id, &principal).await {
        Ok(record) => Ok(HttpResponse::Ok().json(record)),
        Err(err) => Ok(error_response(err)),
    }
}

#[get("/api/executions/{id}")]
async fn get_execution(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let principal = principal_from(&req);
    match data.engine.get_execution(path.into_inner(), &principal).await {
        Ok(record) => Ok(HttpResponse::Ok().json(record)),
        Err(err) => Ok(error_response(err)),
    }
}

#[get("/api/workflows/{id}/executions")]
async fn list_executions(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let principal = principal_from(&req);
    match data.engine.list_executions(path.into_inner(), &principal).await {
        Ok(records) => Ok(HttpResponse::Ok().json(records)),
        Err(err) => Ok(error_response(err)),
    }
}

/// WebSocket feed of execution events.
#[get("/api/events")]
async fn websocket_events(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let (res, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    info!("websocket client connected");

    let mut events = data.engine.subscribe_events();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            if let Ok(json) = serde_json::to_string(&event) {
                                if session.text(json).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(_) => break,
                    }
                }

                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }

                else => break,
            }
        }

        info!("websocket client disconnected");
        let _ = session.close(None).await;
    });

    Ok(res)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("starting loom workflow server");

    let tools_url =
        std::env::var("TOOLS_URL").unwrap_or_else(|_| "http://localhost:7331".to_string());
    let textgen_url =
        std::env::var("TEXTGEN_URL").unwrap_or_else(|_| "http://localhost:7332".to_string());

    let engine = Arc::new(WorkflowEngine::new(
        Arc::new(HttpToolClient::new(tools_url)),
        Arc::new(HttpCompletionClient::new(textgen_url)),
        Arc::new(MemoryWorkflowStore::new()),
        Arc::new(MemoryExecutionStore::new()),
    ));

    let app_state = web::Data::new(AppState { engine });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    info!("server starting on http://{bind_address}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .service(health_check)
            .service(validate_workflow)
            .service(list_workflows)
            .service(create_workflow)
            .service(get_workflow)
            .service(update_workflow)
            .service(delete_workflow)
            .service(execute_workflow)
            .service(get_execution)
            .service(list_executions)
            .service(websocket_events)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
