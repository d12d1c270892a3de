//! Request handlers for every endpoint.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::ai::{build_analysis_prompt, AnalysisOutcome};
use crate::analytics;
use crate::api::middleware::AuthGuard;
use crate::api::AppState;
use crate::assistant;
use crate::error::ApiError;
use crate::extract;
use crate::models::analysis::{report_field, AnalyzeResponse, ExtractionReport};
use crate::models::patient::PatientProfile;
use crate::risk;
use crate::store::RecordKind;

// ===== Health =====

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "polyrisk",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

// ===== Drug catalog =====

#[derive(Debug, Deserialize)]
pub struct DrugQuery {
    pub search: Option<String>,
    pub limit: Option<usize>,
}

pub async fn search_drugs(
    state: web::Data<AppState>,
    query: web::Query<DrugQuery>,
) -> HttpResponse {
    let term = query.search.as_deref().unwrap_or("");
    let results = state.catalog.search(term, query.limit);
    let count = results.len();
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "results": results,
        "count": count,
    }))
}

pub async fn drug_stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "stats": state.catalog.stats(),
        "interactions": state.interactions.stats(),
    }))
}

// ===== Analysis =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub patient_data: Option<PatientProfile>,
}

#[instrument(skip_all)]
pub async fn analyze(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let patient = body
        .into_inner()
        .patient_data
        .ok_or_else(|| ApiError::Invalid("Patient data is required".to_string()))?;
    patient.validate()?;

    let assessment = risk::assess(&patient, state.interactions.as_ref());
    info!(
        "scored patient profile at {:.1} ({}) across {} medication pairs",
        assessment.score,
        assessment.category.as_str(),
        assessment.coverage.pairs_checked
    );

    let extraction = ExtractionReport {
        confidence: extract::confidence_score(&patient),
        real_time: extract::realtime_analysis(&patient),
        data: extract::extract(&patient, state.catalog.as_ref()),
    };

    let prompt = build_analysis_prompt(&patient, &assessment);
    let reply = state.ai.generate(&prompt).await?;

    let outcome = AnalysisOutcome::from_reply(&reply, assessment.score);
    match &outcome {
        AnalysisOutcome::Model { analysis, .. } => {
            if let Some(level) = report_field(analysis, &["risk_summary", "risk_level"]) {
                info!("model reported risk level {}", level);
            }
        }
        AnalysisOutcome::Fallback { .. } => {
            warn!("model reply was not structured; serving fallback analysis");
        }
    }

    Ok(HttpResponse::Ok().json(AnalyzeResponse::assemble(&assessment, extraction, outcome)))
}

// ===== Patient records =====

fn save_response(message: &str, filename: String, saved_at: String) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": message,
        "filename": filename,
        "timestamp": saved_at,
    }))
}

pub async fn save_patient(
    state: web::Data<AppState>,
    body: web::Json<Value>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let receipt = state.store.save(RecordKind::Patient, body.into_inner()).await?;
    Ok(save_response(
        "Patient data saved successfully",
        receipt.filename,
        receipt.saved_at,
    ))
}

pub async fn save_extracted(
    state: web::Data<AppState>,
    body: web::Json<Value>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let receipt = state
        .store
        .save(RecordKind::Extracted, body.into_inner())
        .await?;
    Ok(save_response(
        "Extracted data saved successfully",
        receipt.filename,
        receipt.saved_at,
    ))
}

pub async fn save_analysis(
    state: web::Data<AppState>,
    body: web::Json<Value>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let receipt = state
        .store
        .save(RecordKind::Analysis, body.into_inner())
        .await?;
    Ok(save_response(
        "Analysis data saved successfully",
        receipt.filename,
        receipt.saved_at,
    ))
}

pub async fn save_complete_patient(
    state: web::Data<AppState>,
    body: web::Json<Value>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let receipt = state
        .store
        .save(RecordKind::CompletePatient, body.into_inner())
        .await?;
    Ok(save_response(
        "Complete patient data saved successfully",
        receipt.filename,
        receipt.saved_at,
    ))
}

pub async fn list_patients(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let files = state.store.list().await?;
    let count = files.len();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "files": files,
        "count": count,
    })))
}

pub async fn get_patient(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let record = state.store.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": record,
    })))
}

pub async fn delete_patient(
    state: web::Data<AppState>,
    path: web::Path<String>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    state.store.delete(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Patient file deleted successfully",
    })))
}

pub async fn store_stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = state.store.stats().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "stats": stats,
    })))
}

// ===== Analytics =====

pub async fn analytics_snapshot() -> HttpResponse {
    HttpResponse::Ok().json(analytics::snapshot())
}

// ===== Assistant =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub message: Option<String>,
    #[serde(alias = "conversation_id")]
    pub conversation_id: Option<String>,
}

pub async fn assistant_message(
    body: web::Json<AssistantRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::Invalid("Message is required".to_string()))?;
    Ok(HttpResponse::Ok().json(assistant::respond(&message, request.conversation_id)))
}
