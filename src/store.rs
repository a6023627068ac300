use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::options::ReplaceOptions;
use mongodb::{bson, Collection, Database};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::settings::{StorageBackend, StorageSettings};

/// Durable key-value storage for whole collections. Payloads are opaque
/// json text; interpreting them is left to [`load_collection`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, Error>;

    async fn save(&self, key: &str, payload: String) -> Result<(), Error>;
}

/// Loads the collection stored under `key`. A missing key, an unreadable
/// store or a corrupt payload all yield an empty collection.
#[tracing::instrument(skip(store))]
pub async fn load_collection<T>(store: &dyn KeyValueStore, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    let payload = match store.load(key).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return vec![],
        Err(err) => {
            warn!(key, error = %err, "failed to read collection, starting empty");
            return vec![];
        }
    };

    match serde_json::from_str(&payload) {
        Ok(records) => records,
        Err(err) => {
            warn!(key, error = %err, "discarding corrupt collection");
            vec![]
        }
    }
}

#[tracing::instrument(skip(store, records))]
pub async fn save_collection<'a, T, I>(
    store: &dyn KeyValueStore,
    key: &str,
    records: I,
) -> Result<(), Error>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let records: Vec<&T> = records.into_iter().collect();
    let payload = serde_json::to_string(&records)?;
    store.save(key, payload).await?;

    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, Error> {
        let records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok(records.get(key).cloned())
    }

    async fn save(&self, key: &str, payload: String) -> Result<(), Error> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.insert(key.to_owned(), payload);

        Ok(())
    }
}

/// One `<key>.json` file per collection inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub async fn open(directory: impl Into<PathBuf>) -> Result<FileStore, Error> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;

        Ok(FileStore { directory })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[tracing::instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<String>, Error> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self, payload))]
    async fn save(&self, key: &str, payload: String) -> Result<(), Error> {
        // write aside then rename so a crash never leaves half a file behind
        let path = self.path(key);
        let staging = self.directory.join(format!("{}.json.tmp", key));
        tokio::fs::write(&staging, payload).await?;
        tokio::fs::rename(&staging, &path).await?;

        Ok(())
    }
}

const RECORDS: &str = "records";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub key: String,
    pub payload: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

pub type MongoStore = Collection<Record>;

pub async fn connect_mongo(uri: &str, database: &str) -> Result<MongoStore, Error> {
    let db = mongodb::Client::with_uri_str(uri).await?.database(database);

    // ping the database to ensure connection is established
    db.run_command(bson::doc! { "ping": 1 }, None).await?;

    Ok(mongo_records(&db))
}

pub fn mongo_records(db: &Database) -> MongoStore {
    db.collection(RECORDS)
}

#[async_trait]
impl KeyValueStore for MongoStore {
    #[tracing::instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<String>, Error> {
        let record = self.find_one(bson::doc! { "_id": key }, None).await?;

        Ok(record.map(|record| record.payload))
    }

    #[tracing::instrument(skip(self, payload))]
    async fn save(&self, key: &str, payload: String) -> Result<(), Error> {
        let record = Record {
            key: key.to_owned(),
            payload,
            modified_at: Utc::now(),
        };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.replace_one(bson::doc! { "_id": key }, &record, options)
            .await?;

        Ok(())
    }
}

/// Opens the backend named in the settings.
#[tracing::instrument(skip(settings), fields(backend = ?settings.backend))]
pub async fn open_store(settings: &StorageSettings) -> Result<Box<dyn KeyValueStore>, Error> {
    let store: Box<dyn KeyValueStore> = match settings.backend {
        StorageBackend::Memory => Box::new(MemoryStore::new()),
        StorageBackend::File => Box::new(FileStore::open(&settings.directory).await?),
        StorageBackend::Mongodb => Box::new(
            connect_mongo(&settings.mongodb_uri, &settings.mongodb_database).await?,
        ),
    };

    Ok(store)
}
