use abi::{
    Confirmation, GroupReservation, GroupReserveRequest, Reservation, ReserveRequest,
    RestaurantAvailability, SearchRequest, Validator,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{ApiError, RsvpService};

type ApiResult<T> = Result<T, ApiError>;

pub async fn search(
    State(svc): State<RsvpService>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<RestaurantAvailability>>> {
    let Json(req) = body?;
    let query = req.validate()?;
    let found = reservation::search_restaurants(svc.store(), query).await?;
    Ok(Json(found))
}

pub async fn reserve(
    State(svc): State<RsvpService>,
    body: Result<Json<ReserveRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    let Json(req) = body?;
    let rsvp = reservation::create_reservation(svc.store(), req).await?;
    Ok((StatusCode::CREATED, Json(rsvp)))
}

pub async fn reserve_group(
    State(svc): State<RsvpService>,
    body: Result<Json<GroupReserveRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GroupReservation>)> {
    let Json(req) = body?;
    let group = reservation::create_group_reservation(svc.store(), req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn cancel(
    State(svc): State<RsvpService>,
    Path(id): Path<String>,
) -> ApiResult<Json<Confirmation>> {
    let confirmation = reservation::cancel_reservation(svc.store(), &id).await?;
    Ok(Json(confirmation))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
