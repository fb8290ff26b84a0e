//! Photo upload handlers for machines and work orders.
//!
//! Both endpoints take a multipart body with a single `file` field, store
//! it through the configured [`FileStorage`](crate::storage::FileStorage)
//! backend, and record the resulting public URL on the row.

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use maintrack_core::error::CoreError;
use maintrack_core::photos::{
    content_type_for, image_extension, photo_key, PREFIX_MACHINE, PREFIX_WORK_ORDER,
};
use maintrack_core::types::DbId;
use maintrack_db::repositories::{MachineRepo, WorkOrderRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// An image read from a multipart body.
struct ImageUpload {
    filename: String,
    data: Vec<u8>,
}

/// Read the `file` field of a multipart body, enforcing the size limit.
async fn read_image(mut multipart: Multipart, max_bytes: usize) -> AppResult<ImageUpload> {
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some(ImageUpload {
            filename,
            data: data.to_vec(),
        });
    }

    let upload =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    if upload.data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if upload.data.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File is {} bytes; the limit is {max_bytes} bytes",
            upload.data.len()
        )));
    }
    Ok(upload)
}

/// Store an upload under a fresh key and return its public URL.
async fn store_photo(
    state: &AppState,
    prefix: &str,
    id: DbId,
    upload: ImageUpload,
) -> AppResult<String> {
    let ext = image_extension(&upload.filename)?;
    let key = photo_key(prefix, id, chrono::Utc::now(), &upload.filename)?;
    let size = upload.data.len();

    state
        .storage
        .upload(&key, upload.data, content_type_for(&ext))
        .await?;

    tracing::info!(
        key = %key,
        size,
        backend = state.storage.backend_name(),
        "Photo stored",
    );

    Ok(state.storage.public_url(&key))
}

/// POST /api/v1/machines/{id}/photo
///
/// Upload a machine photo and set its `photo_url`.
pub async fn upload_machine_photo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    super::machines::ensure_machine_exists(&state.pool, id).await?;

    let upload = read_image(multipart, state.config.max_upload_bytes).await?;
    let url = store_photo(&state, PREFIX_MACHINE, id, upload).await?;

    let machine = MachineRepo::set_photo_url(&state.pool, id, &url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id,
        }))?;

    Ok(Json(DataResponse { data: machine }))
}

/// POST /api/v1/work-orders/{id}/photo
///
/// Upload a work-order photo and set its `photo_url`.
pub async fn upload_work_order_photo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    super::work_orders::ensure_work_order_exists(&state.pool, id).await?;

    let upload = read_image(multipart, state.config.max_upload_bytes).await?;
    let url = store_photo(&state, PREFIX_WORK_ORDER, id, upload).await?;

    let work_order = WorkOrderRepo::set_photo_url(&state.pool, id, &url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkOrder",
            id,
        }))?;

    Ok(Json(DataResponse { data: work_order }))
}
