use super::{accept, deleted, found, parse_oid, Response};
use crate::db::AlumniDB;
use alumni_common::http::requests::{ConnectionRequest, LoginRequest};
use alumni_common::http::responses::{MessageResponse, Redacted};
use alumni_common::models::user::{NewUser, UserUpdate};
use alumni_common::models::User;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;

/// POST REQUESTS ///

/**
 * Register a new alumnus
 *
 * @param request - the NewUser body; fullName, email and password are required
 * @return status:
 *             * 201 with the stored user (password hash stripped)
 *             * 400 if a required field is missing, a value has the wrong type,
 *               or role is not one of [user, college]
 *             * 409 if the email is already registered
 *             * 500 if db fails or other unknown issue
 */
#[post("/create", format = "json", data = "<request>")]
pub async fn create_user(
    request: Result<Json<NewUser>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<status::Created<Json<Redacted<User>>>> {
    let user = db.create_user(accept(request)?).await?;
    let location = format!("/user/{}", user.id.map(|id| id.to_hex()).unwrap_or_default());
    Ok(status::Created::new(location).body(Json(Redacted(user))))
}

/**
 * Check an email and password pair
 *
 * @return status:
 *             * 200 with the user on success
 *             * 401 if the email is unknown or the password does not match
 */
#[post("/login", format = "json", data = "<request>")]
pub async fn login(
    request: Result<Json<LoginRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<User>>> {
    let request = accept(request)?;
    let user = db
        .verify_user_credentials(&request.email, &request.password)
        .await?;
    Ok(Json(Redacted(user)))
}

/**
 * Send a connection request from `userId` to `targetUserId`
 *
 * @return status:
 *             * 200 with the sender after the update
 *             * 400 if sending to oneself, already sent, or already connected
 *             * 404 if either user does not exist
 */
#[post("/connection/send", format = "json", data = "<request>")]
pub async fn send_connection_request(
    request: Result<Json<ConnectionRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<User>>> {
    let request = accept(request)?;
    let from = parse_oid(&request.user_id, "userId")?;
    let to = parse_oid(&request.target_user_id, "targetUserId")?;
    Ok(Json(Redacted(db.send_connection_request(&from, &to).await?)))
}

/**
 * Accept the pending request `targetUserId` sent to `userId`
 *
 * @return status:
 *             * 200 with the accepting user after the update
 *             * 400 if there is no pending request from the target
 *             * 404 if either user does not exist
 */
#[post("/connection/accept", format = "json", data = "<request>")]
pub async fn accept_connection_request(
    request: Result<Json<ConnectionRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<User>>> {
    let request = accept(request)?;
    let accepter = parse_oid(&request.user_id, "userId")?;
    let requester = parse_oid(&request.target_user_id, "targetUserId")?;
    let user = db.accept_connection_request(&accepter, &requester).await?;
    Ok(Json(Redacted(user)))
}

#[post("/connection/reject", format = "json", data = "<request>")]
pub async fn reject_connection_request(
    request: Result<Json<ConnectionRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<User>>> {
    let request = accept(request)?;
    let rejecter = parse_oid(&request.user_id, "userId")?;
    let requester = parse_oid(&request.target_user_id, "targetUserId")?;
    let user = db.reject_connection_request(&rejecter, &requester).await?;
    Ok(Json(Redacted(user)))
}

/// GET REQUESTS ///

#[get("/")]
pub async fn list_users(db: &State<AlumniDB>) -> Response<Json<Redacted<Vec<User>>>> {
    Ok(Json(Redacted(db.list_users().await?)))
}

#[get("/<id>")]
pub async fn get_user(id: &str, db: &State<AlumniDB>) -> Response<Json<Redacted<User>>> {
    let id = parse_oid(id, "id")?;
    let user = found(db.get_user(&id).await?, "User")?;
    Ok(Json(Redacted(user)))
}

#[get("/<id>/connections")]
pub async fn get_connections(
    id: &str,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<Vec<User>>>> {
    let id = parse_oid(id, "id")?;
    Ok(Json(Redacted(db.get_connections(&id).await?)))
}

/// PUT / DELETE REQUESTS ///

/**
 * Partially update a user's profile
 * @notice - a new password is re-hashed; connection lists and notifications
 *           only change through the connection routes
 *
 * @return status:
 *             * 200 with the updated user
 *             * 400 if the body sets nothing or fails validation
 *             * 404 if the user does not exist
 *             * 409 if the new email belongs to another user
 */
#[put("/<id>", format = "json", data = "<request>")]
pub async fn update_user(
    id: &str,
    request: Result<Json<UserUpdate>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Redacted<User>>> {
    let id = parse_oid(id, "id")?;
    let user = found(db.update_user(&id, accept(request)?).await?, "User")?;
    Ok(Json(Redacted(user)))
}

#[delete("/<id>")]
pub async fn delete_user(id: &str, db: &State<AlumniDB>) -> Response<Json<MessageResponse>> {
    let id = parse_oid(id, "id")?;
    deleted(db.delete_user(&id).await?, "User")
}
