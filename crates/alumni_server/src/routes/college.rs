use super::{accept, deleted, found, parse_oid, Response};
use crate::db::AlumniDB;
use alumni_common::http::requests::{LoginRequest, UserReferenceRequest};
use alumni_common::http::responses::{MessageResponse, Redacted};
use alumni_common::models::college::{CollegeUpdate, NewCollege};
use alumni_common::models::College;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;

/**
 * Register a college account
 *
 * @param request - the NewCollege body; name, email and password are required
 * @return status:
 *             * 201 with the stored college (password hash stripped)
 *             * 400 on validation failure
 *             * 409 if the email is already registered
 */
#[post("/create", format = "json", data = "<request>")]
pub async fn create_college(
    request: Result<Json<NewCollege>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<status::Created<Json<Redacted<College>>>> {
    let college = db.create_college(accept(request)?).await?;
    let location = format!(
        "/college/{}",
        college.id.map(|id| id.to_hex()).unwrap_or_default()
    );
    Ok(status::Created::new(location).body(Json(Redacted(college))))
}

#[post("/login", format = "json", data = "<request>")]
pub async fn login(
    request: Result<Json<LoginRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<College>>> {
    let request = accept(request)?;
    let college = db
        .verify_college_credentials(&request.email, &request.password)
        .await?;
    Ok(Json(Redacted(college)))
}

/**
 * Add a user to the college's registered alumni
 * @notice - registering the same user twice leaves alumniCount unchanged
 *
 * @return status:
 *             * 200 with the college after the update
 *             * 404 if the college or the user does not exist
 */
#[post("/<id>/alumni", format = "json", data = "<request>")]
pub async fn register_alumnus(
    id: &str,
    request: Result<Json<UserReferenceRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<College>>> {
    let college = parse_oid(id, "id")?;
    let user = parse_oid(&accept(request)?.user_id, "userId")?;
    Ok(Json(Redacted(db.register_alumnus(&college, &user).await?)))
}

#[get("/")]
pub async fn list_colleges(db: &State<AlumniDB>) -> Response<Json<Redacted<Vec<College>>>> {
    Ok(Json(Redacted(db.list_colleges().await?)))
}

#[get("/<id>")]
pub async fn get_college(id: &str, db: &State<AlumniDB>) -> Response<Json<Redacted<College>>> {
    let id = parse_oid(id, "id")?;
    let college = found(db.get_college(&id).await?, "College")?;
    Ok(Json(Redacted(college)))
}

#[put("/<id>", format = "json", data = "<request>")]
pub async fn update_college(
    id: &str,
    request: Result<Json<CollegeUpdate>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<College>>> {
    let id = parse_oid(id, "id")?;
    let college = found(db.update_college(&id, accept(request)?).await?, "College")?;
    Ok(Json(Redacted(college)))
}

#[delete("/<id>")]
pub async fn delete_college(id: &str, db: &State<AlumniDB>) -> Response<Json<MessageResponse>> {
    let id = parse_oid(id, "id")?;
    deleted(db.delete_college(&id).await?, "College")
}
