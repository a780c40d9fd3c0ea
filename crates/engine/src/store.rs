//! Keyed JSON document store.
//!
//! Every record lives in the `documents` table as a JSON body keyed by a
//! uuid string, tagged with its collection name. `occurred_at` is
//! denormalized out of the body so listings can order and range-filter in
//! SQL. Subscribers get the full current result set of a collection after
//! every mutation in it (last snapshot wins).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder, entity::prelude::*,
};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::error::EngineError;

pub mod documents {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "documents")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub collection: String,
        pub occurred_at: DateTimeUtc,
        pub body: Json,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// A stored record, body still in wire form.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub occurred_at: DateTime<Utc>,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<documents::Model> for Document {
    fn from(model: documents::Model) -> Self {
        Self {
            id: model.id,
            collection: model.collection,
            occurred_at: model.occurred_at,
            body: model.body,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Inclusive date-range filter over `occurred_at`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    #[must_use]
    pub const fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }
}

#[derive(Debug)]
pub struct DocumentStore {
    database: DatabaseConnection,
    channels: Mutex<HashMap<String, watch::Sender<Vec<Document>>>>,
}

impl DocumentStore {
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create(
        &self,
        collection: &str,
        occurred_at: DateTime<Utc>,
        body: Value,
    ) -> Result<Document, EngineError> {
        let now = Utc::now();
        let model = documents::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            collection: ActiveValue::Set(collection.to_string()),
            occurred_at: ActiveValue::Set(occurred_at),
            body: ActiveValue::Set(body),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        let inserted = model.insert(&self.database).await?;
        self.publish(collection).await;
        Ok(inserted.into())
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Document, EngineError> {
        let model = documents::Entity::find_by_id(id)
            .filter(documents::Column::Collection.eq(collection))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        Ok(model.into())
    }

    /// Merges `fields` into the stored body. Fields absent from the map
    /// stay untouched; `occurred_at` moves only when a new one is given.
    pub async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<Document, EngineError> {
        let current = self.get(collection, id).await?;

        let mut body = current.body;
        match body.as_object_mut() {
            Some(map) => map.extend(fields),
            None => {
                return Err(EngineError::Document(format!(
                    "document \"{id}\" has a non-object body"
                )));
            }
        }

        let model = documents::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            body: ActiveValue::Set(body),
            occurred_at: occurred_at.map_or(ActiveValue::NotSet, ActiveValue::Set),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let updated = model.update(&self.database).await?;
        self.publish(collection).await;
        Ok(updated.into())
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), EngineError> {
        let result = documents::Entity::delete_many()
            .filter(documents::Column::Id.eq(id))
            .filter(documents::Column::Collection.eq(collection))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }
        self.publish(collection).await;
        Ok(())
    }

    /// All documents in a collection, newest `occurred_at` first.
    pub async fn query(
        &self,
        collection: &str,
        range: DateRange,
    ) -> Result<Vec<Document>, EngineError> {
        let mut query = documents::Entity::find()
            .filter(documents::Column::Collection.eq(collection))
            .order_by_desc(documents::Column::OccurredAt);
        if let Some(from) = range.from {
            query = query.filter(documents::Column::OccurredAt.gte(from));
        }
        if let Some(to) = range.to {
            query = query.filter(documents::Column::OccurredAt.lte(to));
        }
        let models = query.all(&self.database).await?;
        Ok(models.into_iter().map(Document::from).collect())
    }

    pub async fn count(&self, collection: &str, range: DateRange) -> Result<u64, EngineError> {
        let mut query =
            documents::Entity::find().filter(documents::Column::Collection.eq(collection));
        if let Some(from) = range.from {
            query = query.filter(documents::Column::OccurredAt.gte(from));
        }
        if let Some(to) = range.to {
            query = query.filter(documents::Column::OccurredAt.lte(to));
        }
        Ok(query.count(&self.database).await?)
    }

    /// Live query over a collection. The receiver starts with the current
    /// result set and gets the full new one after every mutation.
    /// Dropping the receiver ends the subscription.
    pub async fn subscribe(
        &self,
        collection: &str,
    ) -> Result<watch::Receiver<Vec<Document>>, EngineError> {
        let snapshot = self.query(collection, DateRange::all()).await?;
        let mut channels = self.channels.lock().await;
        let sender = match channels.entry(collection.to_string()) {
            // Mutations while nobody listens skip publishing, so an
            // existing channel may hold a stale snapshot.
            Entry::Occupied(entry) => {
                let sender = entry.into_mut();
                sender.send_replace(snapshot);
                sender
            }
            Entry::Vacant(entry) => entry.insert(watch::channel(snapshot).0),
        };
        Ok(sender.subscribe())
    }

    /// Pushes the current result set to subscribers, if any. A failed
    /// snapshot query is logged and swallowed so it never fails the
    /// mutation that triggered it.
    async fn publish(&self, collection: &str) {
        {
            let channels = self.channels.lock().await;
            match channels.get(collection) {
                Some(sender) if sender.receiver_count() > 0 => {}
                _ => return,
            }
        }

        let snapshot = match self.query(collection, DateRange::all()).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(collection, %error, "live query snapshot failed");
                return;
            }
        };

        let channels = self.channels.lock().await;
        if let Some(sender) = channels.get(collection) {
            let _ = sender.send(snapshot);
        }
    }
}
