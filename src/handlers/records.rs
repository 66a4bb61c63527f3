use std::collections::HashSet;

use actix_web::{web, HttpResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::domain::cart::{self, CartLine};
use crate::domain::menu::{Category, MenuItem};
use crate::domain::order::Order;
use crate::domain::ports::{Storage, StorageKey, StorageMode};
use crate::errors::{AppError, ErrorBody};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn parse_key(raw: &str) -> Result<StorageKey, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("collection '{raw}'")))
}

/// A record's `id` in text form; numeric ids use their decimal form.
fn record_id(record: &Value) -> Option<String> {
    match record.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn record_id_matches(record: &Value, id: &str) -> bool {
    record_id(record).is_some_and(|own| own == id)
}

/// Categories are numbered (highest id + 1); other records get a uuid.
fn next_id(key: StorageKey, records: &[Value]) -> Value {
    match key {
        StorageKey::Categories => {
            let highest = records
                .iter()
                .filter_map(|record| record.get("id").and_then(Value::as_u64))
                .max()
                .unwrap_or(0);
            Value::from(highest.saturating_add(1))
        }
        _ => Value::String(Uuid::now_v7().to_string()),
    }
}

/// Synchronous backends block inside their calls (diesel, a mutex), so they
/// run under `web::block`; asynchronous ones are awaited on the worker.
async fn read_key(
    storage: &web::Data<dyn Storage>,
    key: StorageKey,
) -> Result<Option<Value>, AppError> {
    if storage.mode() == StorageMode::Asynchronous {
        return Ok(storage.read(key).await?);
    }

    let storage = storage.clone().into_inner();
    let handle = Handle::current();
    let value = web::block(move || handle.block_on(storage.read(key)))
        .await
        .map_err(|e| AppError::Internal(format!("storage task failed: {e}")))??;
    Ok(value)
}

async fn write_key(
    storage: &web::Data<dyn Storage>,
    key: StorageKey,
    value: Value,
) -> Result<(), AppError> {
    if storage.mode() == StorageMode::Asynchronous {
        return Ok(storage.write(key, value).await?);
    }

    let storage = storage.clone().into_inner();
    let handle = Handle::current();
    web::block(move || handle.block_on(storage.write(key, value)))
        .await
        .map_err(|e| AppError::Internal(format!("storage task failed: {e}")))??;
    Ok(())
}

/// Loads `key` as a JSON array. An absent collection is empty.
async fn load_collection(
    storage: &web::Data<dyn Storage>,
    key: StorageKey,
) -> Result<Vec<Value>, AppError> {
    match read_key(storage, key).await? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(AppError::BadRequest(format!(
            "collection '{key}' is not an array"
        ))),
    }
}

fn decode<T: DeserializeOwned>(key: StorageKey, records: &[Value]) -> Result<Vec<T>, AppError> {
    serde_json::from_value(Value::Array(records.to_vec()))
        .map_err(|e| AppError::BadRequest(format!("invalid '{key}' record: {e}")))
}

/// Rejects a collection the typed repositories could not read back: records
/// of the wrong shape, duplicate ids, or records that break their own rules.
fn check_collection(key: StorageKey, records: &[Value]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for id in records.iter().filter_map(record_id) {
        if !seen.insert(id.clone()) {
            return Err(AppError::BadRequest(format!(
                "duplicate id '{id}' in '{key}'"
            )));
        }
    }

    let checked = match key {
        StorageKey::Menu => decode::<MenuItem>(key, records)?
            .iter()
            .try_for_each(MenuItem::validate),
        StorageKey::Orders => decode::<Order>(key, records)?
            .iter()
            .try_for_each(Order::validate),
        StorageKey::Cart => cart::check_lines(&decode::<CartLine>(key, records)?),
        StorageKey::Categories => {
            decode::<Category>(key, records)?;
            Ok(())
        }
    };
    checked.map_err(|e| AppError::BadRequest(format!("invalid '{key}' record: {e}")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /{key}
///
/// Returns the stored value of a collection.
#[utoipa::path(
    get,
    path = "/{key}",
    params(
        ("key" = String, Path, description = "Collection: menu, orders, cart or categories"),
    ),
    responses(
        (status = 200, description = "Stored collection"),
        (status = 404, description = "Unknown or never written collection", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "records"
)]
pub async fn get_collection(
    storage: web::Data<dyn Storage>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = parse_key(&path.into_inner())?;

    match read_key(&storage, key).await? {
        Some(value) => Ok(HttpResponse::Ok().json(value)),
        None => Err(AppError::NotFound(format!("collection '{key}'"))),
    }
}

/// PUT /{key}
///
/// Replaces a collection wholesale with the JSON array in the request body.
#[utoipa::path(
    put,
    path = "/{key}",
    params(
        ("key" = String, Path, description = "Collection: menu, orders, cart or categories"),
    ),
    responses(
        (status = 204, description = "Collection replaced"),
        (status = 400, description = "Body is not an array of valid records", body = ErrorBody),
        (status = 404, description = "Unknown collection", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "records"
)]
pub async fn put_collection(
    storage: web::Data<dyn Storage>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let key = parse_key(&path.into_inner())?;

    let Value::Array(records) = body.into_inner() else {
        return Err(AppError::BadRequest(format!(
            "collection '{key}' must be a JSON array"
        )));
    };
    check_collection(key, &records)?;

    write_key(&storage, key, Value::Array(records)).await?;
    log::debug!("collection '{}' replaced", key);
    Ok(HttpResponse::NoContent().finish())
}

/// POST /{key}
///
/// Appends one record to a collection. A record without an `id` is given the
/// next category number, or a time-ordered uuid elsewhere.
#[utoipa::path(
    post,
    path = "/{key}",
    params(
        ("key" = String, Path, description = "Collection: menu, orders, cart or categories"),
    ),
    responses(
        (status = 201, description = "Record appended; body is the stored record"),
        (status = 400, description = "Body is not a valid record or collection is not an array", body = ErrorBody),
        (status = 404, description = "Unknown collection", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "records"
)]
pub async fn append_record(
    storage: web::Data<dyn Storage>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let key = parse_key(&path.into_inner())?;

    let mut records = load_collection(&storage, key).await?;

    let mut record = body.into_inner();
    let Some(fields) = record.as_object_mut() else {
        return Err(AppError::BadRequest("record must be a JSON object".to_string()));
    };
    if !fields.contains_key("id") {
        fields.insert("id".to_string(), next_id(key, &records));
    }

    records.push(record.clone());
    check_collection(key, &records)?;
    write_key(&storage, key, Value::Array(records)).await?;

    Ok(HttpResponse::Created().json(record))
}

/// GET /{key}/{id}
///
/// Returns the record of a collection whose `id` matches.
#[utoipa::path(
    get,
    path = "/{key}/{id}",
    params(
        ("key" = String, Path, description = "Collection: menu, orders, cart or categories"),
        ("id" = String, Path, description = "Record id"),
    ),
    responses(
        (status = 200, description = "Record found"),
        (status = 404, description = "Record not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "records"
)]
pub async fn get_record(
    storage: web::Data<dyn Storage>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (raw_key, id) = path.into_inner();
    let key = parse_key(&raw_key)?;

    load_collection(&storage, key)
        .await?
        .into_iter()
        .find(|record| record_id_matches(record, &id))
        .map(|record| HttpResponse::Ok().json(record))
        .ok_or_else(|| AppError::NotFound(format!("{key}/{id}")))
}

/// DELETE /{key}/{id}
///
/// Removes the record whose `id` matches.
#[utoipa::path(
    delete,
    path = "/{key}/{id}",
    params(
        ("key" = String, Path, description = "Collection: menu, orders, cart or categories"),
        ("id" = String, Path, description = "Record id"),
    ),
    responses(
        (status = 204, description = "Record removed"),
        (status = 404, description = "Record not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "records"
)]
pub async fn delete_record(
    storage: web::Data<dyn Storage>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (raw_key, id) = path.into_inner();
    let key = parse_key(&raw_key)?;

    let mut records = load_collection(&storage, key).await?;
    let before = records.len();
    records.retain(|record| !record_id_matches(record, &id));
    if records.len() == before {
        return Err(AppError::NotFound(format!("{key}/{id}")));
    }

    write_key(&storage, key, Value::Array(records)).await?;
    Ok(HttpResponse::NoContent().finish())
}
