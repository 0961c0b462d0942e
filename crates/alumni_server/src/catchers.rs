use alumni_common::AlumniServerError;
use rocket::request::Request;
use tracing::error;

#[derive(Responder, Debug)]
pub enum AlumniResponse {
    #[response(status = 400)]
    BadRequest(String),
    #[response(status = 401)]
    Unauthorized(String),
    #[response(status = 404)]
    NotFound(String),
    #[response(status = 409)]
    Conflict(String),
    #[response(status = 422)]
    Unprocessable(String),
    #[response(status = 500)]
    InternalError(String),
}

impl From<AlumniServerError> for AlumniResponse {
    fn from(e: AlumniServerError) -> Self {
        let message = e.to_string();
        match e {
            AlumniServerError::Validation(_)
            | AlumniServerError::SelfConnection
            | AlumniServerError::RequestAlreadySent
            | AlumniServerError::AlreadyConnected
            | AlumniServerError::NoPendingRequest(_)
            | AlumniServerError::InvalidDonation => AlumniResponse::BadRequest(message),
            AlumniServerError::InvalidCredentials => AlumniResponse::Unauthorized(message),
            AlumniServerError::NotFound(_) => AlumniResponse::NotFound(message),
            AlumniServerError::Duplicate { .. } | AlumniServerError::EventFull(_) => {
                AlumniResponse::Conflict(message)
            }
            AlumniServerError::MongoError(_)
            | AlumniServerError::Serialization(_)
            | AlumniServerError::Connection(_)
            | AlumniServerError::Config(_) => {
                error!("request failed: {}", message);
                AlumniResponse::InternalError(message)
            }
        }
    }
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> AlumniResponse {
    AlumniResponse::BadRequest("Malformed request".to_string())
}

#[catch(404)]
pub fn not_found(req: &Request) -> AlumniResponse {
    AlumniResponse::NotFound(format!("No route for {}", req.uri()))
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> AlumniResponse {
    AlumniResponse::Unprocessable("Request body could not be parsed".to_string())
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> AlumniResponse {
    AlumniResponse::InternalError("Unknown internal error has occurred".to_string())
}
