use super::{accept, deleted, found, Response};
use crate::db::AlumniDB;
use alumni_common::http::responses::MessageResponse;
use alumni_common::models::job::{JobFilter, JobType, JobUpdate, NewJob};
use alumni_common::models::Job;
use alumni_common::validation::SchemaEnum;
use alumni_common::AlumniServerError;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;

#[derive(FromForm, Debug)]
pub struct JobQuery {
    #[field(name = "type")]
    kind: Option<String>,
    department: Option<String>,
    location: Option<String>,
}

impl JobQuery {
    fn into_filter(self) -> Result<JobFilter, AlumniServerError> {
        let kind = match self.kind {
            Some(kind) => Some(JobType::parse(&kind, "type")?),
            None => None,
        };
        Ok(JobFilter {
            kind,
            department: self.department,
            location: self.location,
        })
    }
}

/**
 * Post a job opening
 *
 * @param request - the NewJob body; type must be one of
 *                  [Full-time, Part-time, Contract, Internship]
 * @return status:
 *             * 201 with the stored job
 *             * 400 on validation failure, nothing is stored
 *             * 409 if the supplied id is taken
 */
#[post("/create", format = "json", data = "<request>")]
pub async fn create_job(
    request: Result<Json<NewJob>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<status::Created<Json<Job>>> {
    let job = db.create_job(accept(request)?).await?;
    Ok(status::Created::new(format!("/job/{}", job.id)).body(Json(job)))
}

/**
 * List jobs, optionally narrowed by `type`, `department` and `location`
 *
 * @return status:
 *             * 200 with the matching jobs
 *             * 400 if `type` is not a known job type
 */
#[get("/?<query..>")]
pub async fn list_jobs(query: JobQuery, db: &State<AlumniDB>) -> Response<Json<Vec<Job>>> {
    let filter = query.into_filter()?;
    Ok(Json(db.list_jobs(&filter).await?))
}

#[get("/<id>")]
pub async fn get_job(id: &str, db: &State<AlumniDB>) -> Response<Json<Job>> {
    Ok(Json(found(db.get_job(id).await?, "Job")?))
}

#[put("/<id>", format = "json", data = "<request>")]
pub async fn update_job(
    id: &str,
    request: Result<Json<JobUpdate>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<Job>> {
    Ok(Json(found(db.update_job(id, accept(request)?).await?, "Job")?))
}

#[delete("/<id>")]
pub async fn delete_job(id: &str, db: &State<AlumniDB>) -> Response<Json<MessageResponse>> {
    deleted(db.delete_job(id).await?, "Job")
}
