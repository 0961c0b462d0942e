#[macro_use]
extern crate rocket;
use catchers::{bad_request, internal_error, not_found, unprocessable};
use config::DatabaseConfig;
use db::AlumniDB;
use rocket::{Build, Rocket};
use routes::{
    COLLEGE_ROUTES, DONATION_ROUTES, EVENT_ROUTES, JOB_ROUTES, POST_ROUTES, USER_ROUTES,
};
use tracing_subscriber::EnvFilter;

mod catchers;
mod config;
mod db;
mod mongo;
mod routes;
mod store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    // connect to mongodb
    let config = DatabaseConfig::from_env()?;
    let db = AlumniDB::connect(&config).await?;
    build_rocket(db).launch().await?;
    Ok(())
}

pub(crate) fn build_rocket(db: AlumniDB) -> Rocket<Build> {
    rocket::build()
        .manage(db)
        .mount("/", routes![health])
        .mount("/user", USER_ROUTES.clone())
        .mount("/college", COLLEGE_ROUTES.clone())
        .mount("/event", EVENT_ROUTES.clone())
        .mount("/job", JOB_ROUTES.clone())
        .mount("/post", POST_ROUTES.clone())
        .mount("/donation", DONATION_ROUTES.clone())
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
}

#[get("/health")]
async fn health() -> &'static str {
    "Hello, world!"
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::MemoryStore;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};

    struct AlumniTestContext {
        client: Client,
    }

    impl AlumniTestContext {
        async fn init() -> Self {
            let db = AlumniDB::with_store(MemoryStore::new()).await.unwrap();
            AlumniTestContext {
                client: Client::tracked(build_rocket(db)).await.unwrap(),
            }
        }

        async fn post(&self, uri: &str, body: Value) -> (Status, Value) {
            let res = self
                .client
                .post(uri.to_string())
                .header(ContentType::JSON)
                .body(body.to_string())
                .dispatch()
                .await;
            let status = res.status();
            (status, body_json(res.into_string().await))
        }

        async fn get(&self, uri: &str) -> (Status, Value) {
            let res = self.client.get(uri.to_string()).dispatch().await;
            let status = res.status();
            (status, body_json(res.into_string().await))
        }
    }

    // error bodies are plain text
    fn body_json(body: Option<String>) -> Value {
        body.and_then(|b| serde_json::from_str(&b).ok())
            .unwrap_or(Value::Null)
    }

    fn user(name: &str, email: &str) -> Value {
        json!({ "fullName": name, "email": email, "password": "hunter22" })
    }

    fn oid(body: &Value) -> String {
        body["_id"]["$oid"].as_str().unwrap().to_string()
    }

    fn job(id: &str, kind: &str) -> Value {
        json!({
            "id": id,
            "title": "Engineer",
            "company": "Acme",
            "logo": "https://example.com/acme.png",
            "location": "Pune",
            "salary": "12 LPA",
            "type": kind,
            "experience": "1-3 years",
            "skills": ["Rust"],
            "description": "Build things",
            "department": "Engineering",
            "postedBy": { "name": "Ravi" }
        })
    }

    #[rocket::async_test]
    async fn test_health() {
        let context = AlumniTestContext::init().await;
        let res = context.client.get("/health").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.into_string().await.unwrap(), "Hello, world!");
    }

    #[rocket::async_test]
    async fn test_create_user_hides_password() {
        let context = AlumniTestContext::init().await;
        let (status, body) = context.post("/user/create", user("Asha", "a@x.com")).await;
        assert_eq!(status, Status::Created);
        assert_eq!(body["fullName"], "Asha");
        assert_eq!(body["role"], "user");
        assert_eq!(body["isUniversityGeneratedPassword"], true);
        assert!(body.get("password").is_none());

        let (status, body) = context.get(&format!("/user/{}", oid(&body))).await;
        assert_eq!(status, Status::Ok);
        assert!(body.get("password").is_none());
    }

    #[rocket::async_test]
    async fn test_duplicate_email_conflict() {
        let context = AlumniTestContext::init().await;
        let (status, _) = context.post("/user/create", user("Asha", "a@x.com")).await;
        assert_eq!(status, Status::Created);
        let (status, _) = context.post("/user/create", user("Other", "a@x.com")).await;
        assert_eq!(status, Status::Conflict);
        let (_, users) = context.get("/user").await;
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["fullName"], "Asha");
    }

    #[rocket::async_test]
    async fn test_bad_bodies_rejected() {
        let context = AlumniTestContext::init().await;
        let (status, _) = context
            .post("/user/create", json!({ "email": "a@x.com", "password": "x" }))
            .await;
        assert_eq!(status, Status::BadRequest);
        let (status, _) = context
            .post(
                "/user/create",
                json!({ "fullName": 7, "email": "a@x.com", "password": "x" }),
            )
            .await;
        assert_eq!(status, Status::BadRequest);
        let (status, _) = context.get("/user/not-an-id").await;
        assert_eq!(status, Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_login() {
        let context = AlumniTestContext::init().await;
        context.post("/user/create", user("Asha", "a@x.com")).await;
        let (status, body) = context
            .post("/user/login", json!({ "email": "a@x.com", "password": "hunter22" }))
            .await;
        assert_eq!(status, Status::Ok);
        assert!(body.get("password").is_none());
        let (status, _) = context
            .post("/user/login", json!({ "email": "a@x.com", "password": "nope" }))
            .await;
        assert_eq!(status, Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_connection_routes() {
        let context = AlumniTestContext::init().await;
        let (_, a) = context.post("/user/create", user("Asha", "a@x.com")).await;
        let (_, b) = context.post("/user/create", user("Bo", "b@x.com")).await;
        let (a, b) = (oid(&a), oid(&b));

        let (status, _) = context
            .post(
                "/user/connection/send",
                json!({ "userId": a, "targetUserId": a }),
            )
            .await;
        assert_eq!(status, Status::BadRequest);
        let (status, _) = context
            .post(
                "/user/connection/send",
                json!({ "userId": a, "targetUserId": b }),
            )
            .await;
        assert_eq!(status, Status::Ok);
        let (status, body) = context
            .post(
                "/user/connection/accept",
                json!({ "userId": b, "targetUserId": a }),
            )
            .await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body["connections"][0]["$oid"], a.as_str());

        let (status, connections) = context.get(&format!("/user/{}/connections", a)).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(connections[0]["fullName"], "Bo");
    }

    #[rocket::async_test]
    async fn test_invalid_job_type_not_stored() {
        let context = AlumniTestContext::init().await;
        let (status, _) = context.post("/job/create", job("j1", "Freelance")).await;
        assert_eq!(status, Status::BadRequest);
        let (status, jobs) = context.get("/job").await;
        assert_eq!(status, Status::Ok);
        assert!(jobs.as_array().unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn test_job_filters() {
        let context = AlumniTestContext::init().await;
        context.post("/job/create", job("j1", "Full-time")).await;
        context.post("/job/create", job("j2", "Internship")).await;
        let (status, jobs) = context.get("/job?type=Internship").await;
        assert_eq!(status, Status::Ok);
        assert_eq!(jobs.as_array().unwrap().len(), 1);
        assert_eq!(jobs[0]["id"], "j2");
        let (status, _) = context.get("/job?type=Freelance").await;
        assert_eq!(status, Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_event_registration_until_full() {
        let context = AlumniTestContext::init().await;
        let (status, event) = context
            .post(
                "/event/create",
                json!({
                    "title": "Alumni Meet",
                    "location": "Main Hall",
                    "date": "2024-03-15",
                    "time": "10:00 AM",
                    "type": "Networking",
                    "price": "Free",
                    "image": "https://example.com/meet.jpg",
                    "agenda": "Talks",
                    "maxCapacity": 1
                }),
            )
            .await;
        assert_eq!(status, Status::Created);
        assert_eq!(event["registeredCount"], 0);
        let id = event["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        let uri = format!("/event/{}/register", id);
        let res = context.client.post(uri.clone()).dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        let res = context.client.post(uri).dispatch().await;
        assert_eq!(res.status(), Status::Conflict);
    }

    #[rocket::async_test]
    async fn test_donation_flow() {
        let context = AlumniTestContext::init().await;
        let (status, campaign) = context
            .post(
                "/donation/create",
                json!({
                    "id": "1",
                    "title": "Library Fund",
                    "description": "New books",
                    "goal": 100000,
                    "raised": 5000,
                    "image": "https://example.com/lib.jpg",
                    "deadline": "2024-12-31",
                    "impact": "Thousands of books",
                    "category": "Infrastructure",
                    "campaignManager": {
                        "name": "Meera",
                        "role": "Librarian",
                        "contact": "meera@college.edu"
                    },
                    "minimumDonation": 100,
                    "suggestedDonations": [100, 500]
                }),
            )
            .await;
        assert_eq!(status, Status::Created);
        assert_eq!(campaign["raised"], 0.0);
        assert_eq!(campaign["donors"], 0);

        let (status, campaign) = context
            .post("/donation/1/donate", json!({ "amount": 250.0 }))
            .await;
        assert_eq!(status, Status::Ok);
        assert_eq!(campaign["raised"], 250.0);
        assert_eq!(campaign["donors"], 1);

        let (status, _) = context
            .post("/donation/1/donate", json!({ "amount": -5.0 }))
            .await;
        assert_eq!(status, Status::BadRequest);
        let (status, _) = context.get("/donation/2").await;
        assert_eq!(status, Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_post_likes_and_comments() {
        let context = AlumniTestContext::init().await;
        let (_, author) = context.post("/user/create", user("Asha", "a@x.com")).await;
        let author = oid(&author);
        let (status, post) = context
            .post(
                "/post/create",
                json!({ "userId": author, "text": "Hello alumni" }),
            )
            .await;
        assert_eq!(status, Status::Created);
        let post = oid(&post);

        let (status, likes) = context
            .post(&format!("/post/{}/like", post), json!({ "userId": author }))
            .await;
        assert_eq!(status, Status::Ok);
        assert_eq!(likes.as_array().unwrap().len(), 1);

        let (status, comments) = context
            .post(
                &format!("/post/{}/comment", post),
                json!({ "userId": author, "text": "First!" }),
            )
            .await;
        assert_eq!(status, Status::Ok);
        let comment = comments[0]["_id"]["$oid"].as_str().unwrap().to_string();
        let res = context
            .client
            .delete(format!("/post/{}/comment/{}", post, comment))
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_unknown_route() {
        let context = AlumniTestContext::init().await;
        let res = context.client.get("/nowhere").dispatch().await;
        assert_eq!(res.status(), Status::NotFound);
    }
}
