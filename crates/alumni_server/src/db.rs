use crate::config::DatabaseConfig;
use crate::mongo::MongoStore;
use crate::store::DocumentStore;
use alumni_common::models::college::{CollegeUpdate, NewCollege};
use alumni_common::models::donation::{
    CampaignUpdateInput, DonationCampaignUpdate, NewDonationCampaign,
};
use alumni_common::models::event::{EventUpdate, NewEvent};
use alumni_common::models::job::{JobFilter, JobUpdate, NewJob};
use alumni_common::models::post::{Comment, Like, NewComment, NewPost, PostUpdate};
use alumni_common::models::user::{NewUser, UserUpdate};
use alumni_common::models::{
    unique_keys, College, DonationCampaign, Entity, Event, Job, Post, User,
};
use alumni_common::password::verify_password;
use alumni_common::{AlumniServerError, Validate};
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Typed gateway to every persisted entity. One instance is built at startup
/// and shared with the request handlers.
pub struct AlumniDB {
    store: Arc<dyn DocumentStore>,
}

fn by_oid(id: &ObjectId) -> Document {
    doc! { "_id": *id }
}

fn by_key(id: &str) -> Document {
    doc! { "id": id }
}

impl AlumniDB {
    /**
     * Connects to MongoDB and prepares the unique indexes
     * @notice - logs exactly one record describing the outcome; the failure is
     *           also returned so the caller decides whether to abort or degrade
     *
     * @param config - connection settings read from the environment
     * @returns - the ready database handle, or a Connection error
     */
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AlumniServerError> {
        match Self::open(config).await {
            Ok(db) => {
                info!(database = %config.database, "connected to database successfully");
                Ok(db)
            }
            Err(e) => {
                error!(database = %config.database, "failed to connect to database: {}", e);
                Err(e)
            }
        }
    }

    async fn open(config: &DatabaseConfig) -> Result<Self, AlumniServerError> {
        let store = MongoStore::connect(config)
            .await
            .map_err(|e| AlumniServerError::Connection(e.to_string()))?;
        Self::with_store(store).await
    }

    /// Wraps any store and registers the unique indexes on it.
    pub async fn with_store(
        store: impl DocumentStore + 'static,
    ) -> Result<Self, AlumniServerError> {
        let store: Arc<dyn DocumentStore> = Arc::new(store);
        for (collection, field) in unique_keys() {
            store.ensure_unique(collection, field).await?;
        }
        Ok(Self { store })
    }

    /// GENERIC HELPERS ///

    async fn insert<E: Entity>(&self, entity: &E) -> Result<E, AlumniServerError> {
        let document = bson::to_document(entity)?;
        let oid = match self.store.insert(E::COLLECTION, document).await {
            Ok(oid) => oid,
            Err(e) => {
                if let AlumniServerError::Duplicate { field, .. } = &e {
                    warn!(kind = E::KIND, field = %field, "rejected duplicate insert");
                }
                return Err(e);
            }
        };
        info!(kind = E::KIND, id = %oid, "created");
        self.find_one::<E>(by_oid(&oid))
            .await?
            .ok_or_else(|| AlumniServerError::NotFound(E::KIND.to_string()))
    }

    async fn find_one<E: Entity>(&self, filter: Document) -> Result<Option<E>, AlumniServerError> {
        match self.store.find_one(E::COLLECTION, filter).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn require<E: Entity>(&self, filter: Document) -> Result<E, AlumniServerError> {
        self.find_one::<E>(filter)
            .await?
            .ok_or_else(|| AlumniServerError::NotFound(E::KIND.to_string()))
    }

    async fn find<E: Entity>(&self, filter: Document) -> Result<Vec<E>, AlumniServerError> {
        self.store
            .find(E::COLLECTION, filter)
            .await?
            .into_iter()
            .map(|document| bson::from_document(document).map_err(AlumniServerError::from))
            .collect()
    }

    async fn update<E: Entity>(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<E>, AlumniServerError> {
        match self
            .store
            .find_one_and_update(E::COLLECTION, filter, update)
            .await
        {
            Ok(Some(document)) => Ok(Some(bson::from_document(document)?)),
            Ok(None) => Ok(None),
            Err(e) => {
                if let AlumniServerError::Duplicate { field, .. } = &e {
                    warn!(kind = E::KIND, field = %field, "rejected duplicate update");
                }
                Err(e)
            }
        }
    }

    async fn update_existing<E: Entity>(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<E, AlumniServerError> {
        self.update::<E>(filter, update)
            .await?
            .ok_or_else(|| AlumniServerError::NotFound(E::KIND.to_string()))
    }

    async fn delete<E: Entity>(&self, filter: Document) -> Result<bool, AlumniServerError> {
        let deleted = self.store.delete_one(E::COLLECTION, filter).await?;
        if deleted {
            info!(kind = E::KIND, "deleted");
        }
        Ok(deleted)
    }

    /// USER FUNCTIONS ///

    pub async fn create_user(&self, candidate: NewUser) -> Result<User, AlumniServerError> {
        let user = candidate.validate()?;
        self.insert(&user).await
    }

    pub async fn get_user(&self, id: &ObjectId) -> Result<Option<User>, AlumniServerError> {
        self.find_one(by_oid(id)).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AlumniServerError> {
        self.find(doc! {}).await
    }

    pub async fn update_user(
        &self,
        id: &ObjectId,
        update: UserUpdate,
    ) -> Result<Option<User>, AlumniServerError> {
        let update = update.validate()?;
        self.update(by_oid(id), update).await
    }

    pub async fn delete_user(&self, id: &ObjectId) -> Result<bool, AlumniServerError> {
        self.delete::<User>(by_oid(id)).await
    }

    pub async fn verify_user_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AlumniServerError> {
        let user = self.find_one::<User>(doc! { "email": email.trim() }).await?;
        match user {
            Some(user) if verify_password(password, &user.password) => Ok(user),
            _ => Err(AlumniServerError::InvalidCredentials),
        }
    }

    /**
     * Records a pending connection request from `from` to `to`
     * @notice - the receiver is notified with the sender's name
     *
     * @param from - the user sending the request
     * @param to - the user receiving the request
     * @returns - the sender after the update
     */
    pub async fn send_connection_request(
        &self,
        from: &ObjectId,
        to: &ObjectId,
    ) -> Result<User, AlumniServerError> {
        if from == to {
            return Err(AlumniServerError::SelfConnection);
        }
        let sender = self.require::<User>(by_oid(from)).await?;
        self.require::<User>(by_oid(to)).await?;
        if sender.sent_requests.contains(to) {
            return Err(AlumniServerError::RequestAlreadySent);
        }
        if sender.connections.contains(to) {
            return Err(AlumniServerError::AlreadyConnected);
        }
        let notification = format!("{} sent you a connection request", sender.full_name);
        self.update_existing::<User>(
            by_oid(to),
            doc! {
                "$addToSet": { "receivedRequests": *from },
                "$push": { "notifications": notification },
            },
        )
        .await?;
        let sender = self
            .update_existing::<User>(by_oid(from), doc! { "$addToSet": { "sentRequests": *to } })
            .await?;
        info!(from = %from, to = %to, "connection request sent");
        Ok(sender)
    }

    /**
     * Accepts a pending request, connecting both users
     *
     * @param accepter - the user who received the request
     * @param requester - the user who sent it
     * @returns - the accepter after the update
     */
    pub async fn accept_connection_request(
        &self,
        accepter: &ObjectId,
        requester: &ObjectId,
    ) -> Result<User, AlumniServerError> {
        let receiver = self.require::<User>(by_oid(accepter)).await?;
        self.require::<User>(by_oid(requester)).await?;
        if !receiver.received_requests.contains(requester) {
            return Err(AlumniServerError::NoPendingRequest(requester.to_hex()));
        }
        let notification = format!("{} accepted your connection request", receiver.full_name);
        self.update_existing::<User>(
            by_oid(requester),
            doc! {
                "$pull": { "sentRequests": *accepter },
                "$addToSet": { "connections": *accepter },
                "$push": { "notifications": notification },
            },
        )
        .await?;
        let receiver = self
            .update_existing::<User>(
                by_oid(accepter),
                doc! {
                    "$pull": { "receivedRequests": *requester },
                    "$addToSet": { "connections": *requester },
                },
            )
            .await?;
        info!(accepter = %accepter, requester = %requester, "connection request accepted");
        Ok(receiver)
    }

    pub async fn reject_connection_request(
        &self,
        rejecter: &ObjectId,
        requester: &ObjectId,
    ) -> Result<User, AlumniServerError> {
        let receiver = self.require::<User>(by_oid(rejecter)).await?;
        self.require::<User>(by_oid(requester)).await?;
        if !receiver.received_requests.contains(requester) {
            return Err(AlumniServerError::NoPendingRequest(requester.to_hex()));
        }
        let notification = format!("{} declined your connection request", receiver.full_name);
        self.update_existing::<User>(
            by_oid(requester),
            doc! {
                "$pull": { "sentRequests": *rejecter },
                "$push": { "notifications": notification },
            },
        )
        .await?;
        let receiver = self
            .update_existing::<User>(
                by_oid(rejecter),
                doc! { "$pull": { "receivedRequests": *requester } },
            )
            .await?;
        info!(rejecter = %rejecter, requester = %requester, "connection request rejected");
        Ok(receiver)
    }

    /// Resolves a user's connection list. Dangling references are skipped.
    pub async fn get_connections(&self, id: &ObjectId) -> Result<Vec<User>, AlumniServerError> {
        let user = self.require::<User>(by_oid(id)).await?;
        if user.connections.is_empty() {
            return Ok(vec![]);
        }
        self.find(doc! { "_id": { "$in": user.connections } }).await
    }

    /// COLLEGE FUNCTIONS ///

    pub async fn create_college(&self, candidate: NewCollege) -> Result<College, AlumniServerError> {
        let college = candidate.validate()?;
        self.insert(&college).await
    }

    pub async fn get_college(&self, id: &ObjectId) -> Result<Option<College>, AlumniServerError> {
        self.find_one(by_oid(id)).await
    }

    pub async fn list_colleges(&self) -> Result<Vec<College>, AlumniServerError> {
        self.find(doc! {}).await
    }

    pub async fn update_college(
        &self,
        id: &ObjectId,
        update: CollegeUpdate,
    ) -> Result<Option<College>, AlumniServerError> {
        let update = update.validate()?;
        self.update(by_oid(id), update).await
    }

    pub async fn delete_college(&self, id: &ObjectId) -> Result<bool, AlumniServerError> {
        self.delete::<College>(by_oid(id)).await
    }

    pub async fn verify_college_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<College, AlumniServerError> {
        let college = self.find_one::<College>(doc! { "email": email.trim() }).await?;
        match college {
            Some(college) if verify_password(password, &college.password) => Ok(college),
            _ => Err(AlumniServerError::InvalidCredentials),
        }
    }

    /// Adds a user to a college's alumni list. alumniCount moves only when
    /// the user was not already registered.
    pub async fn register_alumnus(
        &self,
        college: &ObjectId,
        user: &ObjectId,
    ) -> Result<College, AlumniServerError> {
        let existing = self.require::<College>(by_oid(college)).await?;
        self.require::<User>(by_oid(user)).await?;
        if existing.registered_alumni.contains(user) {
            return Ok(existing);
        }
        let college_doc = self
            .update_existing::<College>(
                by_oid(college),
                doc! {
                    "$addToSet": { "registeredAlumni": *user },
                    "$inc": { "alumniCount": 1 },
                },
            )
            .await?;
        info!(college = %college, user = %user, "alumnus registered");
        Ok(college_doc)
    }

    /// EVENT FUNCTIONS ///

    pub async fn create_event(&self, candidate: NewEvent) -> Result<Event, AlumniServerError> {
        let event = candidate.validate()?;
        self.insert(&event).await
    }

    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, AlumniServerError> {
        self.find_one(by_key(id)).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, AlumniServerError> {
        self.find(doc! {}).await
    }

    pub async fn update_event(
        &self,
        id: &str,
        update: EventUpdate,
    ) -> Result<Option<Event>, AlumniServerError> {
        let update = update.validate()?;
        self.update(by_key(id), update).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<bool, AlumniServerError> {
        self.delete::<Event>(by_key(id)).await
    }

    /// Takes one seat. Capacity is checked before the increment, so two
    /// racing registrations for the last seat can both succeed.
    pub async fn register_for_event(&self, id: &str) -> Result<Event, AlumniServerError> {
        let event = self.require::<Event>(by_key(id)).await?;
        if event.is_full() {
            return Err(AlumniServerError::EventFull(event.id));
        }
        self.update_existing::<Event>(by_key(id), doc! { "$inc": { "registeredCount": 1 } })
            .await
    }

    /// JOB FUNCTIONS ///

    pub async fn create_job(&self, candidate: NewJob) -> Result<Job, AlumniServerError> {
        let job = candidate.validate()?;
        self.insert(&job).await
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<Job>, AlumniServerError> {
        self.find_one(by_key(id)).await
    }

    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, AlumniServerError> {
        self.find(filter.to_document()).await
    }

    pub async fn update_job(
        &self,
        id: &str,
        update: JobUpdate,
    ) -> Result<Option<Job>, AlumniServerError> {
        let update = update.validate()?;
        self.update(by_key(id), update).await
    }

    pub async fn delete_job(&self, id: &str) -> Result<bool, AlumniServerError> {
        self.delete::<Job>(by_key(id)).await
    }

    /// POST FUNCTIONS ///

    pub async fn create_post(&self, candidate: NewPost) -> Result<Post, AlumniServerError> {
        let post = candidate.validate()?;
        self.insert(&post).await
    }

    pub async fn get_post(&self, id: &ObjectId) -> Result<Option<Post>, AlumniServerError> {
        self.find_one(by_oid(id)).await
    }

    /// Newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, AlumniServerError> {
        let mut posts: Vec<Post> = self.find(doc! {}).await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn update_post(
        &self,
        id: &ObjectId,
        update: PostUpdate,
    ) -> Result<Option<Post>, AlumniServerError> {
        let update = update.validate()?;
        self.update(by_oid(id), update).await
    }

    pub async fn delete_post(&self, id: &ObjectId) -> Result<bool, AlumniServerError> {
        self.delete::<Post>(by_oid(id)).await
    }

    /// Likes the post for `user`, or removes the like if one exists.
    pub async fn toggle_like(
        &self,
        post: &ObjectId,
        user: &ObjectId,
    ) -> Result<Vec<Like>, AlumniServerError> {
        let existing = self.require::<Post>(by_oid(post)).await?;
        self.require::<User>(by_oid(user)).await?;
        let update = if existing.is_liked_by(user) {
            doc! { "$pull": { "likes": { "userId": *user } } }
        } else {
            doc! { "$push": { "likes": { "userId": *user } } }
        };
        let updated = self.update_existing::<Post>(by_oid(post), update).await?;
        Ok(updated.likes)
    }

    pub async fn add_comment(
        &self,
        post: &ObjectId,
        candidate: NewComment,
    ) -> Result<Vec<Comment>, AlumniServerError> {
        let comment = candidate.validate()?;
        self.require::<Post>(by_oid(post)).await?;
        self.require::<User>(by_oid(&comment.user_id)).await?;
        let comment = bson::to_bson(&comment)?;
        let updated = self
            .update_existing::<Post>(by_oid(post), doc! { "$push": { "comments": comment } })
            .await?;
        Ok(updated.comments)
    }

    pub async fn delete_comment(
        &self,
        post: &ObjectId,
        comment: &ObjectId,
    ) -> Result<Vec<Comment>, AlumniServerError> {
        let existing = self.require::<Post>(by_oid(post)).await?;
        if !existing.comments.iter().any(|c| &c.id == comment) {
            return Err(AlumniServerError::NotFound("Comment".to_string()));
        }
        let updated = self
            .update_existing::<Post>(
                by_oid(post),
                doc! { "$pull": { "comments": { "_id": *comment } } },
            )
            .await?;
        Ok(updated.comments)
    }

    /// DONATION FUNCTIONS ///

    pub async fn create_donation_campaign(
        &self,
        candidate: NewDonationCampaign,
    ) -> Result<DonationCampaign, AlumniServerError> {
        let campaign = candidate.validate()?;
        self.insert(&campaign).await
    }

    pub async fn get_donation_campaign(
        &self,
        id: &str,
    ) -> Result<Option<DonationCampaign>, AlumniServerError> {
        self.find_one(by_key(id)).await
    }

    pub async fn list_donation_campaigns(&self) -> Result<Vec<DonationCampaign>, AlumniServerError> {
        self.find(doc! {}).await
    }

    pub async fn update_donation_campaign(
        &self,
        id: &str,
        update: DonationCampaignUpdate,
    ) -> Result<Option<DonationCampaign>, AlumniServerError> {
        let update = update.validate()?;
        self.update(by_key(id), update).await
    }

    pub async fn delete_donation_campaign(&self, id: &str) -> Result<bool, AlumniServerError> {
        self.delete::<DonationCampaign>(by_key(id)).await
    }

    /**
     * Records one donation against a campaign
     * @notice - the only write path for `raised` and `donors`; both are
     *           incremented atomically so neither can decrease
     *
     * @param id - the campaign's `id`
     * @param amount - the donated amount, must be positive and finite
     * @returns - the campaign after the donation
     */
    pub async fn record_donation(
        &self,
        id: &str,
        amount: f64,
    ) -> Result<DonationCampaign, AlumniServerError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AlumniServerError::InvalidDonation);
        }
        let campaign = self
            .update_existing::<DonationCampaign>(
                by_key(id),
                doc! { "$inc": { "raised": amount, "donors": 1 } },
            )
            .await?;
        info!(campaign = %id, amount, "donation recorded");
        Ok(campaign)
    }

    pub async fn add_campaign_update(
        &self,
        id: &str,
        candidate: CampaignUpdateInput,
    ) -> Result<DonationCampaign, AlumniServerError> {
        let entry = bson::to_bson(&candidate.validate()?)?;
        self.update_existing::<DonationCampaign>(by_key(id), doc! { "$push": { "updates": entry } })
            .await
    }
}
