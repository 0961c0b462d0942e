use super::{accept, deleted, found, Response};
use crate::db::AlumniDB;
use alumni_common::http::requests::DonationRequest;
use alumni_common::http::responses::MessageResponse;
use alumni_common::models::donation::{
    CampaignUpdateInput, DonationCampaignUpdate, NewDonationCampaign,
};
use alumni_common::models::DonationCampaign;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;

/**
 * Open a donation campaign
 * @notice - raised and donors always start at zero, whatever the body says
 *
 * @return status:
 *             * 201 with the stored campaign
 *             * 400 on validation failure
 *             * 409 if the id is taken
 */
#[post("/create", format = "json", data = "<request>")]
pub async fn create_campaign(
    request: Result<Json<NewDonationCampaign>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<status::Created<Json<DonationCampaign>>> {
    let campaign = db.create_donation_campaign(accept(request)?).await?;
    Ok(status::Created::new(format!("/donation/{}", campaign.id)).body(Json(campaign)))
}

/**
 * Record a donation against a campaign
 *
 * @param request - the DonationRequest containing:
 *             * amount: a positive, finite amount
 * @return status:
 *             * 200 with the campaign after the donation
 *             * 400 if the amount is zero, negative or not finite
 *             * 404 if no campaign has this id
 */
#[post("/<id>/donate", format = "json", data = "<request>")]
pub async fn donate(
    id: &str,
    request: Result<Json<DonationRequest>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<DonationCampaign>> {
    let amount = accept(request)?.amount;
    Ok(Json(db.record_donation(id, amount).await?))
}

#[post("/<id>/update", format = "json", data = "<request>")]
pub async fn add_campaign_update(
    id: &str,
    request: Result<Json<CampaignUpdateInput>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<DonationCampaign>> {
    Ok(Json(db.add_campaign_update(id, accept(request)?).await?))
}

#[get("/")]
pub async fn list_campaigns(db: &State<AlumniDB>) -> Response<Json<Vec<DonationCampaign>>> {
    Ok(Json(db.list_donation_campaigns().await?))
}

#[get("/<id>")]
pub async fn get_campaign(id: &str, db: &State<AlumniDB>) -> Response<Json<DonationCampaign>> {
    let campaign = found(db.get_donation_campaign(id).await?, "DonationCampaign")?;
    Ok(Json(campaign))
}

#[put("/<id>", format = "json", data = "<request>")]
pub async fn update_campaign(
    id: &str,
    request: Result<Json<DonationCampaignUpdate>, json::Error<'_>>,
    db: &State<AlumniDB>,
) -> Response<Json<DonationCampaign>> {
    let campaign = db
        .update_donation_campaign(id, accept(request)?)
        .await?;
    Ok(Json(found(campaign, "DonationCampaign")?))
}

#[delete("/<id>")]
pub async fn delete_campaign(id: &str, db: &State<AlumniDB>) -> Response<Json<MessageResponse>> {
    deleted(db.delete_donation_campaign(id).await?, "DonationCampaign")
}
