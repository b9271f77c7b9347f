// src/store/mongo.rs
use anyhow::{Context, Result};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ReadPreference, SelectionCriteria};
use mongodb::{Client, Collection, IndexModel};

use super::ActionStore;
use crate::ingest::types::RecentAction;

const RECENT_ACTIONS_COLLECTION: &str = "recent_actions";
const CREATION_TIME_KEY: &str = "timeSeconds";

/// MongoDB-backed store; one document per action in `recent_actions`.
pub struct MongoStore {
    collection: Collection<RecentAction>,
}

impl MongoStore {
    /// Connect, ping the primary and make sure `timeSeconds` is indexed.
    ///
    /// Connection and ping failures are returned; a failed index build is
    /// only logged since the store still works without it.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        tracing::info!(target: "store", database, "connecting to mongo");

        let client = Client::with_uri_str(uri)
            .await
            .context("creating mongo client")?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .selection_criteria(SelectionCriteria::ReadPreference(ReadPreference::Primary))
            .await
            .context("pinging mongo primary")?;

        let collection = db.collection::<RecentAction>(RECENT_ACTIONS_COLLECTION);
        let index = IndexModel::builder()
            .keys(doc! { CREATION_TIME_KEY: 1 })
            .build();
        if let Err(e) = collection.create_index(index).await {
            tracing::warn!(target: "store", error = %e, "could not ensure timeSeconds index");
        }

        Ok(Self { collection })
    }
}

#[async_trait::async_trait]
impl ActionStore for MongoStore {
    async fn append(&self, actions: &[RecentAction]) -> Result<()> {
        // insert_many rejects an empty batch
        if actions.is_empty() {
            return Ok(());
        }
        tracing::info!(target: "store", count = actions.len(), "persisting batch to mongo");

        self.collection.insert_many(actions).await.map_err(|e| {
            tracing::debug!(target: "store", ?actions, "bulk insert payload");
            anyhow::Error::new(e).context("bulk insert of recent actions")
        })?;
        Ok(())
    }

    async fn query_after(&self, timestamp: i64) -> Result<Vec<RecentAction>> {
        tracing::info!(target: "store", timestamp, "retrieving actions since timestamp");

        let filter = doc! { CREATION_TIME_KEY: { "$gte": timestamp } };
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { CREATION_TIME_KEY: 1 })
            .await
            .context("querying recent actions")?;
        let actions: Vec<RecentAction> = cursor
            .try_collect()
            .await
            .context("decoding recent actions")?;

        tracing::info!(target: "store", count = actions.len(), "retrieved actions");
        Ok(actions)
    }

    async fn max_stored_timestamp(&self) -> Result<i64> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "max": { "$max": format!("${CREATION_TIME_KEY}") },
            }
        }];
        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .context("aggregating max timeSeconds")?;

        // Empty collection -> no group document at all.
        let Some(row) = cursor
            .try_next()
            .await
            .context("decoding max timeSeconds")?
        else {
            return Ok(0);
        };
        Ok(max_from_row(&row))
    }

    fn name(&self) -> &'static str {
        "mongo"
    }
}

fn max_from_row(row: &Document) -> i64 {
    match row.get("max") {
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}
