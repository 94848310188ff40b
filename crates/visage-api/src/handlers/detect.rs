//! Face detection handlers.
//!
//! Both endpoints resolve `filePath` on the local filesystem and run the
//! pipeline on a blocking thread so detection work never stalls the async
//! runtime. Timing starts when the handler is entered and is reported in
//! whole milliseconds.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{debug, error, info, warn};
use visage_engine::{EngineError, EngineResult};
use visage_models::{
    BatchDetectRequest, BatchDetectResponse, BatchItem, DetectRequest, DetectResponse, Face,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Detect faces in a single photo.
pub async fn detect_faces(
    State(state): State<AppState>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> ApiResult<Json<DetectResponse>> {
    let started = Instant::now();

    let Json(request) = payload.map_err(|_| ApiError::validation("Request body must be JSON"))?;

    let file_id = request.file_id.unwrap_or_default();
    let file_path = request.file_path.unwrap_or_default();
    if file_id.is_empty() || file_path.is_empty() {
        return Err(ApiError::validation(
            "Missing required fields: fileId, filePath",
        ));
    }

    let path = PathBuf::from(&file_path);
    if !path.exists() {
        return Err(ApiError::not_found(format!("File not found: {file_path}")));
    }

    debug!(file_id = %file_id, path = %file_path, "Starting face detection");

    match run_detection(&state, file_id.clone(), path).await {
        Ok(faces) => {
            let face_count = faces.len();
            let processing_time_ms = elapsed_ms(started);
            info!(
                file_id = %file_id,
                faces = face_count,
                elapsed_ms = processing_time_ms,
                "Face detection completed"
            );
            Ok(Json(DetectResponse {
                file_id,
                faces,
                face_count,
                processing_time_ms,
            }))
        }
        Err(e) => {
            error!(file_id = %file_id, error = %e, "Face detection failed");
            Err(ApiError::from_engine(e, elapsed_ms(started)))
        }
    }
}

/// Detect faces in multiple photos with one round trip.
///
/// Photos are processed in request order and each produces exactly one
/// result entry; a failed photo becomes an entry with an `error` message and
/// never aborts the rest of the batch.
pub async fn batch_detect(
    State(state): State<AppState>,
    payload: Result<Json<BatchDetectRequest>, JsonRejection>,
) -> ApiResult<Json<BatchDetectResponse>> {
    let started = Instant::now();

    let Json(request) =
        payload.map_err(|rejection| ApiError::batch_failed(rejection.body_text()))?;

    let photos = request.photos.unwrap_or_default();
    if photos.is_empty() {
        return Err(ApiError::validation("No photos provided"));
    }

    let total_photos = photos.len();
    let mut results = Vec::with_capacity(total_photos);
    let mut total_faces = 0usize;

    for photo in photos {
        let file_id = photo.file_id.unwrap_or_default();
        let file_path = photo.file_path.unwrap_or_default();

        if file_id.is_empty() || file_path.is_empty() {
            let id = if file_id.is_empty() {
                "unknown".to_string()
            } else {
                file_id
            };
            results.push(BatchItem::failure(id, "Missing fileId or filePath"));
            continue;
        }

        let path = PathBuf::from(&file_path);
        if !path.exists() {
            results.push(BatchItem::failure(file_id, "File not found"));
            continue;
        }

        match run_detection(&state, file_id.clone(), path).await {
            Ok(faces) => {
                total_faces += faces.len();
                results.push(BatchItem::success(file_id, faces));
            }
            Err(e) => {
                warn!(file_id = %file_id, error = %e, "Batch photo failed");
                results.push(BatchItem::failure(file_id, e.to_string()));
            }
        }
    }

    let processing_time_ms = elapsed_ms(started);
    info!(
        photos = total_photos,
        faces = total_faces,
        elapsed_ms = processing_time_ms,
        "Batch detection completed"
    );

    Ok(Json(BatchDetectResponse {
        results,
        total_photos,
        total_faces,
        processing_time_ms,
    }))
}

/// Run the pipeline on a blocking thread.
async fn run_detection(
    state: &AppState,
    file_id: String,
    path: PathBuf,
) -> EngineResult<Vec<Face>> {
    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || engine.detect_file(&file_id, &path))
        .await
        .map_err(|e| EngineError::internal(format!("detection task failed: {e}")))?
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
