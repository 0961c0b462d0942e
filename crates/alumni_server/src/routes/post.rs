use super::{accept, deleted, found, parse_oid, Response};
use crate::db::AlumniDB;
use alumni_common::http::requests::UserReferenceRequest;
use alumni_common::http::responses::MessageResponse;
use alumni_common::models::post::{Comment, Like, NewComment, NewPost, PostUpdate};
use alumni_common::models::Post;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;

/// POST REQUESTS ///

#[post("/create", format = "json", data = "<request>")]
pub async fn create_post(
    request: Result<Json<NewPost>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<status::Created<Json<Post>>> {
    let post = db.create_post(accept(request)?).await?;
    let location = format!("/post/{}", post.id.map(|id| id.to_hex()).unwrap_or_default());
    Ok(status::Created::new(location).body(Json(post)))
}

/**
 * Like a post, or remove the like if `userId` already liked it
 *
 * @return status:
 *             * 200 with the post's likes after the toggle
 *             * 400 if either identifier is malformed
 *             * 404 if the post or the user does not exist
 */
#[post("/<id>/like", format = "json", data = "<request>")]
pub async fn toggle_like(
    id: &str,
    request: Result<Json<UserReferenceRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Vec<Like>>> {
    let post = parse_oid(id, "id")?;
    let user = parse_oid(&accept(request)?.user_id, "userId")?;
    Ok(Json(db.toggle_like(&post, &user).await?))
}

#[post("/<id>/comment", format = "json", data = "<request>")]
pub async fn add_comment(
    id: &str,
    request: Result<Json<NewComment>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Vec<Comment>>> {
    let post = parse_oid(id, "id")?;
    Ok(Json(db.add_comment(&post, accept(request)?).await?))
}

/// GET REQUESTS ///

#[get("/")]
pub async fn list_posts(db: &State<AlumniDB>) -> Response<Json<Vec<Post>>> {
    Ok(Json(db.list_posts().await?))
}

#[get("/<id>")]
pub async fn get_post(id: &str, db: &State<AlumniDB>) -> Response<Json<Post>> {
    let id = parse_oid(id, "id")?;
    Ok(Json(found(db.get_post(&id).await?, "Post")?))
}

/// PUT / DELETE REQUESTS ///

#[put("/<id>", format = "json", data = "<request>")]
pub async fn update_post(
    id: &str,
    request: Result<Json<PostUpdate>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Post>> {
    let id = parse_oid(id, "id")?;
    Ok(Json(found(db.update_post(&id, accept(request)?).await?, "Post")?))
}

#[delete("/<id>")]
pub async fn delete_post(id: &str, db: &State<AlumniDB>) -> Response<Json<MessageResponse>> {
    let id = parse_oid(id, "id")?;
    deleted(db.delete_post(&id).await?, "Post")
}

#[delete("/<id>/comment/<comment_id>")]
pub async fn delete_comment(
    id: &str,
    comment_id: &str,
    db: &State<AlumniDB>,
) -> Response<Json<Vec<Comment>>> {
    let post = parse_oid(id, "id")?;
    let comment = parse_oid(comment_id, "commentId")?;
    Ok(Json(db.delete_comment(&post, &comment).await?))
}
