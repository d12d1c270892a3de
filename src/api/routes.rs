//! Route table.
//!
//! Fixed paths under /api/patients are registered before the
//! `{filename}` capture so "stats" and the save endpoints are never
//! swallowed by it.

use actix_web::web;

use crate::api::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/drugs", web::get().to(handlers::search_drugs))
            .route("/drugs/stats", web::get().to(handlers::drug_stats))
            .route("/analyze", web::post().to(handlers::analyze))
            .route("/analytics", web::get().to(handlers::analytics_snapshot))
            .route("/assistant", web::post().to(handlers::assistant_message))
            .route("/patients", web::post().to(handlers::save_patient))
            .route("/patients", web::get().to(handlers::list_patients))
            .route("/patients/extracted", web::post().to(handlers::save_extracted))
            .route("/patients/analysis", web::post().to(handlers::save_analysis))
            .route(
                "/patients/complete",
                web::post().to(handlers::save_complete_patient),
            )
            .route("/patients/stats", web::get().to(handlers::store_stats))
            .route("/patients/{filename}", web::get().to(handlers::get_patient))
            .route(
                "/patients/{filename}",
                web::delete().to(handlers::delete_patient),
            ),
    );
}
