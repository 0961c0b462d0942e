use crate::models::Entity;
use crate::validation::{
    date, into_set_update, non_negative, optional_object_id, required, required_text, set_field,
    Validate, ValidationError,
};
use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CampaignUpdate {
    pub date: DateTime,
    pub message: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Testimonial {
    pub name: String,
    pub message: String,
    pub image: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CampaignManager {
    pub name: String,
    pub role: String,
    pub contact: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationCampaign {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,
    pub id: String,
    #[serde(rename = "college_id", default)]
    pub college_id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub goal: f64,
    // raised and donors only ever grow, through recorded donations
    #[serde(default)]
    pub raised: f64,
    #[serde(default)]
    pub donors: i64,
    pub image: String,
    pub deadline: DateTime,
    pub impact: String,
    pub category: String,
    #[serde(default)]
    pub updates: Vec<CampaignUpdate>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    pub campaign_manager: CampaignManager,
    pub tax_benefits: Option<String>,
    pub minimum_donation: f64,
    pub suggested_donations: Vec<f64>,
}

impl Entity for DonationCampaign {
    const COLLECTION: &'static str = "donationcampaigns";
    const UNIQUE_KEYS: &'static [&'static str] = &["id"];
    const KIND: &'static str = "DonationCampaign";
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CampaignUpdateInput {
    pub date: Option<String>,
    pub message: Option<String>,
    pub image: Option<String>,
}

impl Validate for CampaignUpdateInput {
    type Output = CampaignUpdate;

    fn validate(self) -> Result<CampaignUpdate, ValidationError> {
        let when = required_text(self.date, "updates.date")?;
        Ok(CampaignUpdate {
            date: date(&when, "updates.date")?,
            message: required_text(self.message, "updates.message")?,
            image: self.image,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TestimonialInput {
    pub name: Option<String>,
    pub message: Option<String>,
    pub image: Option<String>,
    pub year: Option<String>,
}

impl Validate for TestimonialInput {
    type Output = Testimonial;

    fn validate(self) -> Result<Testimonial, ValidationError> {
        Ok(Testimonial {
            name: required_text(self.name, "testimonials.name")?,
            message: required_text(self.message, "testimonials.message")?,
            image: self.image,
            year: self.year,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CampaignManagerInput {
    pub name: Option<String>,
    pub role: Option<String>,
    pub contact: Option<String>,
}

impl Validate for CampaignManagerInput {
    type Output = CampaignManager;

    fn validate(self) -> Result<CampaignManager, ValidationError> {
        Ok(CampaignManager {
            name: required_text(self.name, "campaignManager.name")?,
            role: required_text(self.role, "campaignManager.role")?,
            contact: required_text(self.contact, "campaignManager.contact")?,
        })
    }
}

fn validate_all<T: Validate>(items: Vec<T>) -> Result<Vec<T::Output>, ValidationError> {
    items.into_iter().map(Validate::validate).collect()
}

fn amounts(values: Vec<f64>, field: &str) -> Result<Vec<f64>, ValidationError> {
    values.into_iter().map(|v| non_negative(v, field)).collect()
}

/// Candidate for a new campaign. `raised` and `donors` are not accepted:
/// every campaign starts at zero.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewDonationCampaign {
    pub id: Option<String>,
    #[serde(rename = "college_id")]
    pub college_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<f64>,
    pub image: Option<String>,
    pub deadline: Option<String>,
    pub impact: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub updates: Vec<CampaignUpdateInput>,
    #[serde(default)]
    pub testimonials: Vec<TestimonialInput>,
    pub campaign_manager: Option<CampaignManagerInput>,
    pub tax_benefits: Option<String>,
    pub minimum_donation: Option<f64>,
    #[serde(default)]
    pub suggested_donations: Vec<f64>,
}

impl Validate for NewDonationCampaign {
    type Output = DonationCampaign;

    fn validate(self) -> Result<DonationCampaign, ValidationError> {
        let deadline = required_text(self.deadline, "deadline")?;
        Ok(DonationCampaign {
            oid: None,
            id: required_text(self.id, "id")?,
            college_id: optional_object_id(self.college_id, "college_id")?,
            title: required_text(self.title, "title")?,
            description: required_text(self.description, "description")?,
            goal: non_negative(required(self.goal, "goal")?, "goal")?,
            raised: 0.0,
            donors: 0,
            image: required_text(self.image, "image")?,
            deadline: date(&deadline, "deadline")?,
            impact: required_text(self.impact, "impact")?,
            category: required_text(self.category, "category")?,
            updates: validate_all(self.updates)?,
            testimonials: validate_all(self.testimonials)?,
            campaign_manager: required(self.campaign_manager, "campaignManager")?.validate()?,
            tax_benefits: self.tax_benefits,
            minimum_donation: non_negative(
                required(self.minimum_donation, "minimumDonation")?,
                "minimumDonation",
            )?,
            suggested_donations: amounts(self.suggested_donations, "suggestedDonations")?,
        })
    }
}

/// Partial update of a campaign's description fields. `raised` and `donors`
/// are deliberately absent so they can only move through donations.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DonationCampaignUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<f64>,
    pub image: Option<String>,
    pub deadline: Option<String>,
    pub impact: Option<String>,
    pub category: Option<String>,
    pub testimonials: Option<Vec<TestimonialInput>>,
    pub campaign_manager: Option<CampaignManagerInput>,
    pub tax_benefits: Option<String>,
    pub minimum_donation: Option<f64>,
    pub suggested_donations: Option<Vec<f64>>,
}

impl Validate for DonationCampaignUpdate {
    type Output = Document;

    fn validate(self) -> Result<Document, ValidationError> {
        let mut set = Document::new();
        let required_fields = [
            ("title", self.title),
            ("description", self.description),
            ("image", self.image),
            ("impact", self.impact),
            ("category", self.category),
        ];
        for (key, value) in required_fields {
            if value.is_some() {
                set_field(&mut set, key, &required_text(value, key)?)?;
            }
        }
        if let Some(goal) = self.goal {
            set_field(&mut set, "goal", &non_negative(goal, "goal")?)?;
        }
        if self.deadline.is_some() {
            let deadline = required_text(self.deadline, "deadline")?;
            set_field(&mut set, "deadline", &date(&deadline, "deadline")?)?;
        }
        if let Some(testimonials) = self.testimonials {
            set_field(&mut set, "testimonials", &validate_all(testimonials)?)?;
        }
        if let Some(manager) = self.campaign_manager {
            set_field(&mut set, "campaignManager", &manager.validate()?)?;
        }
        if let Some(tax) = self.tax_benefits {
            set_field(&mut set, "taxBenefits", &tax)?;
        }
        if let Some(minimum) = self.minimum_donation {
            set_field(&mut set, "minimumDonation", &non_negative(minimum, "minimumDonation")?)?;
        }
        if let Some(suggested) = self.suggested_donations {
            set_field(&mut set, "suggestedDonations", &amounts(suggested, "suggestedDonations")?)?;
        }
        into_set_update(set)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bson::Bson;

    fn candidate() -> NewDonationCampaign {
        NewDonationCampaign {
            id: Some("1".to_string()),
            title: Some("Student Scholarship Fund 2024".to_string()),
            description: Some("Help underprivileged students".to_string()),
            goal: Some(2_500_000.0),
            image: Some("https://example.com/scholarship.jpg".to_string()),
            deadline: Some("2024-12-31".to_string()),
            impact: Some("Will support 50 students".to_string()),
            category: Some("Education".to_string()),
            campaign_manager: Some(CampaignManagerInput {
                name: Some("Dr. Priya Singh".to_string()),
                role: Some("Education Committee Head".to_string()),
                contact: Some("priya.singh@edu.in".to_string()),
            }),
            minimum_donation: Some(1000.0),
            suggested_donations: vec![1000.0, 5000.0, 10000.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_new_campaign_starts_at_zero() {
        let campaign = candidate().validate().unwrap();
        assert_eq!(campaign.raised, 0.0);
        assert_eq!(campaign.donors, 0);
        let doc = bson::to_document(&campaign).unwrap();
        assert_eq!(doc.get("raised"), Some(&Bson::Double(0.0)));
        assert_eq!(doc.get("donors"), Some(&Bson::Int64(0)));
    }

    #[test]
    fn test_raised_and_donors_ignored_from_input() {
        let json = serde_json::json!({
            "id": "2",
            "title": "Library",
            "description": "Books",
            "goal": 10.0,
            "raised": 999.0,
            "donors": 5,
            "image": "x.png",
            "deadline": "2025-01-01",
            "impact": "More books",
            "category": "Infra",
            "campaignManager": { "name": "A", "role": "B", "contact": "C" },
            "minimumDonation": 1.0
        });
        let candidate: NewDonationCampaign = serde_json::from_value(json).unwrap();
        let campaign = candidate.validate().unwrap();
        assert_eq!(campaign.raised, 0.0);
        assert_eq!(campaign.donors, 0);
        assert!(campaign.suggested_donations.is_empty());
    }

    #[test]
    fn test_id_required() {
        let err = NewDonationCampaign {
            id: None,
            ..candidate()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("id".to_string()));
    }

    #[test]
    fn test_embedded_documents_validated() {
        let err = NewDonationCampaign {
            updates: vec![CampaignUpdateInput {
                date: Some("2024-01-15".to_string()),
                message: None,
                image: None,
            }],
            ..candidate()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("updates.message".to_string()));

        let err = NewDonationCampaign {
            campaign_manager: Some(CampaignManagerInput::default()),
            ..candidate()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField("campaignManager.name".to_string())
        );
    }

    #[test]
    fn test_negative_goal_rejected() {
        let err = NewDonationCampaign {
            goal: Some(-5.0),
            ..candidate()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn test_update_cannot_touch_counters() {
        let json = serde_json::json!({ "title": "New title", "raised": 0.0 });
        let update: DonationCampaignUpdate = serde_json::from_value(json).unwrap();
        let doc = update.validate().unwrap();
        let set = doc.get_document("$set").unwrap();
        assert!(set.contains_key("title"));
        assert!(!set.contains_key("raised"));
    }
}
