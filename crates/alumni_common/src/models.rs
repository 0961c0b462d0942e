use serde::{de::DeserializeOwned, Serialize};

pub mod college;
pub mod donation;
pub mod event;
pub mod job;
pub mod post;
pub mod user;

pub use college::College;
pub use donation::DonationCampaign;
pub use event::Event;
pub use job::Job;
pub use post::Post;
pub use user::User;

/// A persisted record kind with its own collection and lifecycle.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, matching the names existing documents live under.
    const COLLECTION: &'static str;
    /// Fields backed by a unique index.
    const UNIQUE_KEYS: &'static [&'static str];
    /// Human readable kind used in error messages.
    const KIND: &'static str;
}

/// Every (collection, field) pair that must carry a unique index.
pub fn unique_keys() -> Vec<(&'static str, &'static str)> {
    fn keys<E: Entity>() -> impl Iterator<Item = (&'static str, &'static str)> {
        E::UNIQUE_KEYS.iter().map(|key| (E::COLLECTION, *key))
    }
    keys::<User>()
        .chain(keys::<College>())
        .chain(keys::<Event>())
        .chain(keys::<Job>())
        .chain(keys::<Post>())
        .chain(keys::<DonationCampaign>())
        .collect()
}

/// Generates the identifier used for Event and Job when the caller omits one.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
