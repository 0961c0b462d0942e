use crate::models::{generate_id, Entity};
use crate::validation::{
    into_set_update, optional_object_id, required, required_text, set_field, SchemaEnum,
    Validate, ValidationError,
};
use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
}

impl SchemaEnum for JobType {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("Full-time", JobType::FullTime),
        ("Part-time", JobType::PartTime),
        ("Contract", JobType::Contract),
        ("Internship", JobType::Internship),
    ];
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PostedBy {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,
    pub id: String,
    pub title: String,
    pub company: String,
    pub logo: String,
    pub location: String,
    pub salary: String,
    #[serde(rename = "type")]
    pub kind: JobType,
    pub experience: String,
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub description: String,
    #[serde(default = "DateTime::now")]
    pub posted_date: DateTime,
    pub department: String,
    #[serde(default = "default_vacancies")]
    pub vacancies: i64,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub jd_pdf: Option<String>,
    pub posted_by: PostedBy,
    #[serde(rename = "college_id", default)]
    pub college_id: Option<ObjectId>,
}

impl Entity for Job {
    const COLLECTION: &'static str = "jobs";
    const UNIQUE_KEYS: &'static [&'static str] = &["id"];
    const KIND: &'static str = "Job";
}

fn default_vacancies() -> i64 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PostedByInput {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub logo: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub experience: Option<String>,
    // omitted stores []; an explicit null is rejected by the parser
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub vacancies: Option<i64>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub jd_pdf: Option<String>,
    pub posted_by: Option<PostedByInput>,
    #[serde(rename = "college_id")]
    pub college_id: Option<String>,
}

fn vacancies(value: i64) -> Result<i64, ValidationError> {
    if value < 1 {
        return Err(ValidationError::InvalidValue {
            field: "vacancies".to_string(),
            reason: format!("{} is below the minimum of 1", value),
        });
    }
    Ok(value)
}

impl Validate for NewJob {
    type Output = Job;

    fn validate(self) -> Result<Job, ValidationError> {
        let id = match self.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => id,
            _ => generate_id(),
        };
        let kind = JobType::parse(&required_text(self.kind, "type")?, "type")?;
        let posted_by = required(self.posted_by, "postedBy")?;
        Ok(Job {
            oid: None,
            id,
            title: required_text(self.title, "title")?,
            company: required_text(self.company, "company")?,
            logo: required_text(self.logo, "logo")?,
            location: required_text(self.location, "location")?,
            salary: required_text(self.salary, "salary")?,
            kind,
            experience: required_text(self.experience, "experience")?,
            skills: self.skills,
            benefits: self.benefits,
            description: required_text(self.description, "description")?,
            posted_date: DateTime::now(),
            department: required_text(self.department, "department")?,
            vacancies: vacancies(self.vacancies.unwrap_or_else(default_vacancies))?,
            requirements: self.requirements,
            jd_pdf: self.jd_pdf,
            posted_by: PostedBy {
                name: required_text(posted_by.name, "postedBy.name")?,
            },
            college_id: optional_object_id(self.college_id, "college_id")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub title: Option<String>,
    pub company: Option<String>,
    pub logo: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub vacancies: Option<i64>,
    pub requirements: Option<Vec<String>>,
    pub jd_pdf: Option<String>,
    pub posted_by: Option<PostedByInput>,
}

impl Validate for JobUpdate {
    type Output = Document;

    fn validate(self) -> Result<Document, ValidationError> {
        let mut set = Document::new();
        if self.kind.is_some() {
            let kind = JobType::parse(&required_text(self.kind, "type")?, "type")?;
            set_field(&mut set, "type", &kind)?;
        }
        let required_fields = [
            ("title", self.title),
            ("company", self.company),
            ("logo", self.logo),
            ("location", self.location),
            ("salary", self.salary),
            ("experience", self.experience),
            ("description", self.description),
            ("department", self.department),
        ];
        for (key, value) in required_fields {
            if value.is_some() {
                set_field(&mut set, key, &required_text(value, key)?)?;
            }
        }
        let lists = [
            ("skills", self.skills),
            ("benefits", self.benefits),
            ("requirements", self.requirements),
        ];
        for (key, value) in lists {
            if let Some(value) = value {
                set_field(&mut set, key, &value)?;
            }
        }
        if let Some(count) = self.vacancies {
            set_field(&mut set, "vacancies", &vacancies(count)?)?;
        }
        if let Some(pdf) = self.jd_pdf {
            set_field(&mut set, "jdPdf", &pdf)?;
        }
        if let Some(posted_by) = self.posted_by {
            let posted_by = PostedBy {
                name: required_text(posted_by.name, "postedBy.name")?,
            };
            set_field(&mut set, "postedBy", &posted_by)?;
        }
        into_set_update(set)
    }
}

/// Optional equality filters for listing jobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub kind: Option<JobType>,
    pub department: Option<String>,
    pub location: Option<String>,
}

impl JobFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(kind) = self.kind {
            filter.insert("type", kind.as_str());
        }
        if let Some(department) = &self.department {
            filter.insert("department", department.as_str());
        }
        if let Some(location) = &self.location {
            filter.insert("location", location.as_str());
        }
        filter
    }
}
