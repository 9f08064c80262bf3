//! Update-then-create upsert keyed by entity id.

use crate::error::ApiError;
use crate::remote::{ControlPlane, EntityTarget, RemoteResponse};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Write `body` to `target`: update first, create on 404.
///
/// Any update failure other than 404 is returned without attempting a
/// create. A failed create is returned as well. On success the payload of
/// the response envelope is returned, if the control plane sent one.
pub async fn upsert(
    plane: &dyn ControlPlane,
    target: &EntityTarget,
    body: &Value,
) -> Result<Option<Value>, ApiError> {
    let updated = plane.update(target, body).await?;
    if updated.is_success() {
        debug!(kind = %target.kind, id = %target.id, "Updated remote entity");
        return Ok(updated.data());
    }
    if !updated.is_not_found() {
        return Err(failure("update", target, &updated));
    }

    debug!(kind = %target.kind, id = %target.id, "Remote entity missing; creating");
    let created = plane.create(target, body).await?;
    if created.is_success() {
        debug!(kind = %target.kind, id = %target.id, "Created remote entity");
        return Ok(created.data());
    }
    Err(failure("create", target, &created))
}

/// Serialize `value` and upsert it.
pub async fn upsert_serialized<T: Serialize + ?Sized>(
    plane: &dyn ControlPlane,
    target: &EntityTarget,
    value: &T,
) -> Result<Option<Value>, ApiError> {
    let body = serde_json::to_value(value)?;
    upsert(plane, target, &body).await
}

pub(crate) fn failure(operation: &str, target: &EntityTarget, response: &RemoteResponse) -> ApiError {
    ApiError::RemoteFailure {
        operation: operation.to_string(),
        kind: target.kind.to_string(),
        id: target.id.clone(),
        status: response.status,
        message: response.error_message(),
    }
}
