use crate::models::Entity;
use crate::password::hash_password;
use crate::validation::{
    into_set_update, optional_date, required_text, set_field, SchemaEnum, Validate,
    ValidationError,
};
use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    College,
}

impl SchemaEnum for UserRole {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("user", UserRole::User), ("college", UserRole::College)];
}

// yearOfGraduation = null means the degree is still in progress
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    #[serde(default)]
    pub year_of_graduation: Option<i32>,
}

// endDate = null means the position is current
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub company_name: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<DateTime>,
    #[serde(default)]
    pub end_date: Option<DateTime>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Project {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: Option<String>,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<DateTime>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    pub password: String, // argon2 PHC string, or bcrypt on older rows
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_university_generated_password: bool,
    pub profile_photo: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub location: Option<Location>,
    #[serde(default)]
    pub connections: Vec<ObjectId>,
    #[serde(default)]
    pub received_requests: Vec<ObjectId>,
    #[serde(default)]
    pub sent_requests: Vec<ObjectId>,
    #[serde(default)]
    pub notifications: Vec<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub website: Option<String>,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_KEYS: &'static [&'static str] = &["email"];
    const KIND: &'static str = "User";
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceInput {
    pub company_name: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

impl Validate for WorkExperienceInput {
    type Output = WorkExperience;

    fn validate(self) -> Result<WorkExperience, ValidationError> {
        Ok(WorkExperience {
            company_name: self.company_name,
            role: self.role,
            start_date: optional_date(self.start_date, "workExperience.startDate")?,
            end_date: optional_date(self.end_date, "workExperience.endDate")?,
            description: self.description,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CertificationInput {
    pub name: Option<String>,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<String>,
}

impl Validate for CertificationInput {
    type Output = Certification;

    fn validate(self) -> Result<Certification, ValidationError> {
        Ok(Certification {
            name: self.name,
            issuing_organization: self.issuing_organization,
            issue_date: optional_date(self.issue_date, "certifications.issueDate")?,
        })
    }
}

fn validate_all<T: Validate>(items: Vec<T>) -> Result<Vec<T::Output>, ValidationError> {
    items.into_iter().map(Validate::validate).collect()
}

/// Candidate for a new User as received from the API layer.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_university_generated_password: Option<bool>,
    pub profile_photo: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperienceInput>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub certifications: Vec<CertificationInput>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub location: Option<Location>,
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub website: Option<String>,
}

impl Validate for NewUser {
    type Output = User;

    fn validate(self) -> Result<User, ValidationError> {
        let full_name = required_text(self.full_name, "fullName")?;
        let email = required_text(self.email, "email")?;
        let password = required_text(self.password, "password")?;
        let role = match self.role {
            Some(role) => UserRole::parse(&role, "role")?,
            None => UserRole::default(),
        };
        Ok(User {
            id: None,
            full_name,
            email,
            password: hash_password(&password)?,
            role,
            is_university_generated_password: self
                .is_university_generated_password
                .unwrap_or(true),
            profile_photo: self.profile_photo,
            phone: self.phone,
            address: self.address,
            education: self.education,
            work_experience: validate_all(self.work_experience)?,
            skills: self.skills,
            projects: self.projects,
            certifications: validate_all(self.certifications)?,
            languages: self.languages,
            location: self.location,
            connections: vec![],
            received_requests: vec![],
            sent_requests: vec![],
            notifications: vec![],
            bio: self.bio,
            interests: self.interests,
            website: self.website,
            created_at: DateTime::now(),
        })
    }
}

/// Partial update of a User's profile. Relationship lists and role are
/// managed by dedicated operations and cannot be set here.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_university_generated_password: Option<bool>,
    pub profile_photo: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub education: Option<Vec<Education>>,
    pub work_experience: Option<Vec<WorkExperienceInput>>,
    pub skills: Option<Vec<String>>,
    pub projects: Option<Vec<Project>>,
    pub certifications: Option<Vec<CertificationInput>>,
    pub languages: Option<Vec<String>>,
    pub location: Option<Location>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub website: Option<String>,
}

impl Validate for UserUpdate {
    type Output = Document;

    fn validate(self) -> Result<Document, ValidationError> {
        let mut set = Document::new();
        if self.full_name.is_some() {
            set_field(&mut set, "fullName", &required_text(self.full_name, "fullName")?)?;
        }
        if self.email.is_some() {
            set_field(&mut set, "email", &required_text(self.email, "email")?)?;
        }
        if self.password.is_some() {
            let password = required_text(self.password, "password")?;
            set_field(&mut set, "password", &hash_password(&password)?)?;
        }
        if let Some(flag) = self.is_university_generated_password {
            set_field(&mut set, "isUniversityGeneratedPassword", &flag)?;
        }
        if let Some(v) = self.profile_photo {
            set_field(&mut set, "profilePhoto", &v)?;
        }
        if let Some(v) = self.phone {
            set_field(&mut set, "phone", &v)?;
        }
        if let Some(v) = self.address {
            set_field(&mut set, "address", &v)?;
        }
        if let Some(v) = self.education {
            set_field(&mut set, "education", &v)?;
        }
        if let Some(v) = self.work_experience {
            set_field(&mut set, "workExperience", &validate_all(v)?)?;
        }
        if let Some(v) = self.skills {
            set_field(&mut set, "skills", &v)?;
        }
        if let Some(v) = self.projects {
            set_field(&mut set, "projects", &v)?;
        }
        if let Some(v) = self.certifications {
            set_field(&mut set, "certifications", &validate_all(v)?)?;
        }
        if let Some(v) = self.languages {
            set_field(&mut set, "languages", &v)?;
        }
        if let Some(v) = self.location {
            set_field(&mut set, "location", &v)?;
        }
        if let Some(v) = self.bio {
            set_field(&mut set, "bio", &v)?;
        }
        if let Some(v) = self.interests {
            set_field(&mut set, "interests", &v)?;
        }
        if let Some(v) = self.website {
            set_field(&mut set, "website", &v)?;
        }
        into_set_update(set)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::password::verify_password;
    use bson::Bson;

    fn candidate() -> NewUser {
        NewUser {
            full_name: Some("Asha Rao".to_string()),
            email: Some(" a@x.com ".to_string()),
            password: Some("s3cret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_user_defaults() {
        let user = candidate().validate().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, UserRole::User);
        assert!(user.is_university_generated_password);
        assert!(user.connections.is_empty());
        assert!(user.received_requests.is_empty());
        assert!(user.sent_requests.is_empty());
        assert!(user.id.is_none());
    }

    #[test]
    fn test_password_is_hashed() {
        let user = candidate().validate().unwrap();
        assert_ne!(user.password, "s3cret");
        assert!(verify_password("s3cret", &user.password));
    }

    #[test]
    fn test_missing_required_fields() {
        let mut missing_email = candidate();
        missing_email.email = None;
        assert_eq!(
            missing_email.validate().unwrap_err(),
            ValidationError::MissingField("email".to_string())
        );
        let mut blank_name = candidate();
        blank_name.full_name = Some("".to_string());
        assert_eq!(
            blank_name.validate().unwrap_err(),
            ValidationError::MissingField("fullName".to_string())
        );
    }

    #[test]
    fn test_role_must_be_known() {
        let mut admin = candidate();
        admin.role = Some("admin".to_string());
        assert!(matches!(
            admin.validate(),
            Err(ValidationError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_ongoing_positions_store_null() {
        let mut user = candidate();
        user.education = vec![Education {
            degree: Some("B.Tech".to_string()),
            institution: Some("NIT".to_string()),
            year_of_graduation: None,
        }];
        user.work_experience = vec![WorkExperienceInput {
            company_name: Some("Acme".to_string()),
            start_date: Some("2022-07-01".to_string()),
            ..Default::default()
        }];
        let doc = bson::to_document(&user.validate().unwrap()).unwrap();
        let education = doc.get_array("education").unwrap()[0].as_document().unwrap();
        assert_eq!(education.get("yearOfGraduation"), Some(&Bson::Null));
        let work = doc.get_array("workExperience").unwrap()[0].as_document().unwrap();
        assert_eq!(work.get("endDate"), Some(&Bson::Null));
        assert!(matches!(work.get("startDate"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn test_stored_field_names() {
        let doc = bson::to_document(&candidate().validate().unwrap()).unwrap();
        for key in [
            "fullName",
            "email",
            "password",
            "role",
            "isUniversityGeneratedPassword",
            "workExperience",
            "receivedRequests",
            "sentRequests",
            "createdAt",
        ] {
            assert!(doc.contains_key(key), "missing {}", key);
        }
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn test_update_hashes_password_and_skips_unset() {
        let update = UserUpdate {
            bio: Some("Hello".to_string()),
            password: Some("new-pass".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("bio").unwrap(), "Hello");
        assert!(verify_password("new-pass", set.get_str("password").unwrap()));
        assert!(!set.contains_key("fullName"));
    }

    #[test]
    fn test_empty_update_rejected() {
        assert_eq!(
            UserUpdate::default().validate().unwrap_err(),
            ValidationError::EmptyUpdate
        );
    }
}
