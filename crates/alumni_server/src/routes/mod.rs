use crate::catchers::AlumniResponse;
use alumni_common::http::responses::MessageResponse;
use alumni_common::validation::object_id;
use alumni_common::AlumniServerError;
use lazy_static::lazy_static;
use mongodb::bson::oid::ObjectId;
use rocket::route::Route;
use rocket::serde::json::{self, Json};

mod college;
mod donation;
mod event;
mod job;
mod post;
mod user;

lazy_static! {
    pub(crate) static ref USER_ROUTES: Vec<Route> = routes![
        user::create_user,
        user::login,
        user::list_users,
        user::get_user,
        user::update_user,
        user::delete_user,
        user::send_connection_request,
        user::accept_connection_request,
        user::reject_connection_request,
        user::get_connections
    ];
    pub(crate) static ref COLLEGE_ROUTES: Vec<Route> = routes![
        college::create_college,
        college::login,
        college::list_colleges,
        college::get_college,
        college::update_college,
        college::delete_college,
        college::register_alumnus
    ];
    pub(crate) static ref EVENT_ROUTES: Vec<Route> = routes![
        event::create_event,
        event::list_events,
        event::get_event,
        event::update_event,
        event::delete_event,
        event::register_for_event
    ];
    pub(crate) static ref JOB_ROUTES: Vec<Route> = routes![
        job::create_job,
        job::list_jobs,
        job::get_job,
        job::update_job,
        job::delete_job
    ];
    pub(crate) static ref POST_ROUTES: Vec<Route> = routes![
        post::create_post,
        post::list_posts,
        post::get_post,
        post::update_post,
        post::delete_post,
        post::toggle_like,
        post::add_comment,
        post::delete_comment
    ];
    pub(crate) static ref DONATION_ROUTES: Vec<Route> = routes![
        donation::create_campaign,
        donation::list_campaigns,
        donation::get_campaign,
        donation::update_campaign,
        donation::delete_campaign,
        donation::donate,
        donation::add_campaign_update
    ];
}

pub(crate) type Response<T> = Result<T, AlumniResponse>;

/// Unwraps a JSON body, turning type mismatches into a 400 with the parser's reason.
pub(crate) fn accept<T>(body: Result<Json<T>, json::Error<'_>>) -> Response<T> {
    body.map(Json::into_inner)
        .map_err(|e| AlumniResponse::BadRequest(format!("Invalid request body: {}", e)))
}

pub(crate) fn parse_oid(value: &str, field: &str) -> Response<ObjectId> {
    object_id(value, field).map_err(|e| AlumniServerError::from(e).into())
}

pub(crate) fn found<T>(value: Option<T>, kind: &str) -> Response<T> {
    value.ok_or_else(|| AlumniServerError::NotFound(kind.to_string()).into())
}

pub(crate) fn deleted(deleted: bool, kind: &str) -> Response<Json<MessageResponse>> {
    match deleted {
        true => Ok(Json(MessageResponse::new(format!("{} deleted", kind)))),
        false => Err(AlumniServerError::NotFound(kind.to_string()).into()),
    }
}
