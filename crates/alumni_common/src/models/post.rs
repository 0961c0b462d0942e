use crate::models::Entity;
use crate::validation::{
    into_set_update, object_id, required_text, set_field, SchemaEnum, Validate, ValidationError,
};
use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl SchemaEnum for MediaType {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("image", MediaType::Image), ("video", MediaType::Video)];
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaType,
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: ObjectId,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub text: String,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default = "DateTime::now")]
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub text: String,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default = "DateTime::now")]
    pub updated_at: DateTime,
}

impl Entity for Post {
    const COLLECTION: &'static str = "posts";
    const UNIQUE_KEYS: &'static [&'static str] = &[];
    const KIND: &'static str = "Post";
}

impl Post {
    pub fn is_liked_by(&self, user: &ObjectId) -> bool {
        self.likes.iter().any(|like| &like.user_id == user)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MediaInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl Validate for MediaInput {
    type Output = Media;

    fn validate(self) -> Result<Media, ValidationError> {
        Ok(Media {
            kind: MediaType::parse(&required_text(self.kind, "media.type")?, "media.type")?,
            url: required_text(self.url, "media.url")?,
            description: self.description,
        })
    }
}

fn validate_media(media: Vec<MediaInput>) -> Result<Vec<Media>, ValidationError> {
    media.into_iter().map(Validate::validate).collect()
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaInput>,
}

impl Validate for NewPost {
    type Output = Post;

    fn validate(self) -> Result<Post, ValidationError> {
        let user_id = object_id(&required_text(self.user_id, "userId")?, "userId")?;
        let now = DateTime::now();
        Ok(Post {
            id: None,
            user_id,
            text: required_text(self.text, "text")?,
            media: validate_media(self.media)?,
            likes: vec![],
            comments: vec![],
            created_at: now,
            updated_at: now,
        })
    }
}

/// Edits a post's content. Likes and comments have their own operations.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PostUpdate {
    pub text: Option<String>,
    pub media: Option<Vec<MediaInput>>,
}

impl Validate for PostUpdate {
    type Output = Document;

    fn validate(self) -> Result<Document, ValidationError> {
        let mut set = Document::new();
        if self.text.is_some() {
            set_field(&mut set, "text", &required_text(self.text, "text")?)?;
        }
        if let Some(media) = self.media {
            set_field(&mut set, "media", &validate_media(media)?)?;
        }
        if set.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        set_field(&mut set, "updatedAt", &DateTime::now())?;
        into_set_update(set)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub user_id: Option<String>,
    pub text: Option<String>,
}

impl Validate for NewComment {
    type Output = Comment;

    fn validate(self) -> Result<Comment, ValidationError> {
        let user_id = object_id(&required_text(self.user_id, "userId")?, "userId")?;
        let now = DateTime::now();
        Ok(Comment {
            id: ObjectId::new(),
            user_id,
            text: required_text(self.text, "text")?,
            likes: vec![],
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const USER: &str = "65a1b2c3d4e5f60718293a4b";

    fn candidate() -> NewPost {
        NewPost {
            user_id: Some(USER.to_string()),
            text: Some("Reunion photos are up!".to_string()),
            media: vec![MediaInput {
                kind: Some("image".to_string()),
                url: Some("https://example.com/1.jpg".to_string()),
                description: None,
            }],
        }
    }

    #[test]
    fn test_new_post() {
        let post = candidate().validate().unwrap();
        assert_eq!(post.user_id.to_hex(), USER);
        assert_eq!(post.media[0].kind, MediaType::Image);
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_user_id_required_and_parsed() {
        let missing = NewPost {
            user_id: None,
            ..candidate()
        };
        assert_eq!(
            missing.validate().unwrap_err(),
            ValidationError::MissingField("userId".to_string())
        );
        let garbage = NewPost {
            user_id: Some("someone".to_string()),
            ..candidate()
        };
        assert!(matches!(
            garbage.validate(),
            Err(ValidationError::InvalidObjectId { .. })
        ));
    }

    #[test]
    fn test_media_type_restricted() {
        let post = NewPost {
            media: vec![MediaInput {
                kind: Some("audio".to_string()),
                url: Some("https://example.com/a.mp3".to_string()),
                description: None,
            }],
            ..candidate()
        };
        assert!(matches!(
            post.validate(),
            Err(ValidationError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_update_touches_updated_at() {
        let update = PostUpdate {
            text: Some("edited".to_string()),
            media: None,
        }
        .validate()
        .unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("text").unwrap(), "edited");
        assert!(set.get_datetime("updatedAt").is_ok());
        assert_eq!(
            PostUpdate::default().validate().unwrap_err(),
            ValidationError::EmptyUpdate
        );
    }

    #[test]
    fn test_comment_gets_identifier() {
        let a = NewComment {
            user_id: Some(USER.to_string()),
            text: Some("Congrats!".to_string()),
        }
        .validate()
        .unwrap();
        let b = NewComment {
            user_id: Some(USER.to_string()),
            text: Some("Congrats!".to_string()),
        }
        .validate()
        .unwrap();
        assert_ne!(a.id, b.id);
    }
}
