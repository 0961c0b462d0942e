use super::{accept, deleted, found, Response};
use crate::db::AlumniDB;
use alumni_common::http::responses::MessageResponse;
use alumni_common::models::event::{EventUpdate, NewEvent};
use alumni_common::models::Event;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;

/**
 * Publish an event
 * @notice - an omitted or blank `id` is replaced with a generated UUID
 *
 * @return status:
 *             * 201 with the stored event
 *             * 400 on validation failure
 *             * 409 if the supplied id is taken
 */
#[post("/create", format = "json", data = "<request>")]
pub async fn create_event(
    request: Result<Json<NewEvent>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<status::Created<Json<Event>>> {
    let event = db.create_event(accept(request)?).await?;
    Ok(status::Created::new(format!("/event/{}", event.id)).body(Json(event)))
}

/**
 * Take one seat at an event
 *
 * @return status:
 *             * 200 with the event after registration
 *             * 404 if no event has this id
 *             * 409 if registeredCount already reached maxCapacity
 */
#[post("/<id>/register")]
pub async fn register_for_event(id: &str, db: &State<AlumniDB>) -> Response<Json<Event>> {
    Ok(Json(db.register_for_event(id).await?))
}

#[get("/")]
pub async fn list_events(db: &State<AlumniDB>) -> Response<Json<Vec<Event>>> {
    Ok(Json(db.list_events().await?))
}

#[get("/<id>")]
pub async fn get_event(id: &str, db: &State<AlumniDB>) -> Response<Json<Event>> {
    Ok(Json(found(db.get_event(id).await?, "Event")?))
}

#[put("/<id>", format = "json", data = "<request>")]
pub async fn update_event(
    id: &str,
    request: Result<Json<EventUpdate>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Event>> {
    let event = found(db.update_event(id, accept(request)?).await?, "Event")?;
    Ok(Json(event))
}

#[delete("/<id>")]
pub async fn delete_event(id: &str, db: &State<AlumniDB>) -> Response<Json<MessageResponse>> {
    deleted(db.delete_event(id).await?, "Event")
}
