use crate::models::Entity;
use crate::password::hash_password;
use crate::validation::{into_set_update, required_text, set_field, Validate, ValidationError};
use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct College {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub contact_number: Option<String>,
    pub accreditation: Option<String>,
    pub ranking: Option<String>,
    pub established_year: Option<i32>,
    #[serde(default)]
    pub courses_offered: Vec<String>,
    pub mission_statement: Option<String>,
    pub vision_statement: Option<String>,
    pub tagline: Option<String>,
    #[serde(default)]
    pub banners: Vec<String>,
    // informational only, may drift from registered_alumni.len()
    #[serde(default)]
    pub alumni_count: i64,
    #[serde(default)]
    pub registered_alumni: Vec<ObjectId>,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
}

impl Entity for College {
    const COLLECTION: &'static str = "colleges";
    const UNIQUE_KEYS: &'static [&'static str] = &["email"];
    const KIND: &'static str = "College";
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewCollege {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub contact_number: Option<String>,
    pub accreditation: Option<String>,
    pub ranking: Option<String>,
    pub established_year: Option<i32>,
    #[serde(default)]
    pub courses_offered: Vec<String>,
    pub mission_statement: Option<String>,
    pub vision_statement: Option<String>,
    pub tagline: Option<String>,
    #[serde(default)]
    pub banners: Vec<String>,
    pub alumni_count: Option<i64>,
}

impl Validate for NewCollege {
    type Output = College;

    fn validate(self) -> Result<College, ValidationError> {
        let name = required_text(self.name, "name")?;
        let email = required_text(self.email, "email")?;
        let password = required_text(self.password, "password")?;
        Ok(College {
            id: None,
            name,
            email,
            password: hash_password(&password)?,
            logo: self.logo,
            address: self.address,
            website: self.website,
            contact_number: self.contact_number,
            accreditation: self.accreditation,
            ranking: self.ranking,
            established_year: self.established_year,
            courses_offered: self.courses_offered,
            mission_statement: self.mission_statement,
            vision_statement: self.vision_statement,
            tagline: self.tagline,
            banners: self.banners,
            alumni_count: self.alumni_count.unwrap_or(0),
            registered_alumni: vec![],
            created_at: DateTime::now(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CollegeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub contact_number: Option<String>,
    pub accreditation: Option<String>,
    pub ranking: Option<String>,
    pub established_year: Option<i32>,
    pub courses_offered: Option<Vec<String>>,
    pub mission_statement: Option<String>,
    pub vision_statement: Option<String>,
    pub tagline: Option<String>,
    pub banners: Option<Vec<String>>,
    pub alumni_count: Option<i64>,
}

impl Validate for CollegeUpdate {
    type Output = Document;

    fn validate(self) -> Result<Document, ValidationError> {
        let mut set = Document::new();
        if self.name.is_some() {
            set_field(&mut set, "name", &required_text(self.name, "name")?)?;
        }
        if self.email.is_some() {
            set_field(&mut set, "email", &required_text(self.email, "email")?)?;
        }
        if self.password.is_some() {
            let password = required_text(self.password, "password")?;
            set_field(&mut set, "password", &hash_password(&password)?)?;
        }
        let optional_text = [
            ("logo", self.logo),
            ("address", self.address),
            ("website", self.website),
            ("contactNumber", self.contact_number),
            ("accreditation", self.accreditation),
            ("ranking", self.ranking),
            ("missionStatement", self.mission_statement),
            ("visionStatement", self.vision_statement),
            ("tagline", self.tagline),
        ];
        for (key, value) in optional_text {
            if let Some(value) = value {
                set_field(&mut set, key, &value)?;
            }
        }
        if let Some(year) = self.established_year {
            set_field(&mut set, "establishedYear", &year)?;
        }
        if let Some(courses) = self.courses_offered {
            set_field(&mut set, "coursesOffered", &courses)?;
        }
        if let Some(banners) = self.banners {
            set_field(&mut set, "banners", &banners)?;
        }
        if let Some(count) = self.alumni_count {
            set_field(&mut set, "alumniCount", &count)?;
        }
        into_set_update(set)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_college_defaults() {
        let college = NewCollege {
            name: Some("NIT Trichy".to_string()),
            email: Some("admin@nitt.edu".to_string()),
            password: Some("pw".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(college.alumni_count, 0);
        assert!(college.registered_alumni.is_empty());
        assert!(college.password.starts_with("$argon2"));
    }

    #[test]
    fn test_new_college_requires_email() {
        let err = NewCollege {
            name: Some("NIT Trichy".to_string()),
            password: Some("pw".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("email".to_string()));
    }

    #[test]
    fn test_update_sets_camel_case_keys() {
        let update = CollegeUpdate {
            contact_number: Some("0431".to_string()),
            established_year: Some(1964),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("contactNumber").unwrap(), "0431");
        assert_eq!(set.get_i32("establishedYear").unwrap(), 1964);
        assert_eq!(set.len(), 2);
    }
}
