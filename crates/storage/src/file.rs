//! Gzip-compressed JSON document store (`user_data.json.gz`).

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flash_core::model::UserDirectory;

use crate::records::DirectoryRecord;
use crate::repository::{StorageError, UserStore};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn join(e: tokio::task::JoinError) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Keeps the whole user mapping in one gzip-compressed JSON file.
#[derive(Debug, Clone)]
pub struct GzipJsonRepository {
    path: PathBuf,
}

impl GzipJsonRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<DirectoryRecord>, StorageError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut json = String::new();
        GzDecoder::new(BufReader::new(file)).read_to_string(&mut json)?;
        if json.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&json).map(Some).map_err(ser)
    }

    fn write_document(&self, record: &DirectoryRecord) -> Result<(), StorageError> {
        let staging = self.path.with_extension("tmp");
        {
            let out = BufWriter::new(File::create(&staging)?);
            let mut gzip = GzEncoder::new(out, Compression::default());
            serde_json::to_writer_pretty(&mut gzip, record).map_err(ser)?;
            gzip.finish()?.flush()?;
        }
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for GzipJsonRepository {
    async fn load(&self) -> Result<UserDirectory, StorageError> {
        // File and gzip I/O block; keep them off the async workers.
        let repo = self.clone();
        let document = tokio::task::spawn_blocking(move || repo.read_document())
            .await
            .map_err(join)??;
        match document {
            Some(record) => {
                let directory = record.into_directory()?;
                log::debug!(
                    "loaded {} user(s) from {}",
                    directory.len(),
                    self.path.display()
                );
                Ok(directory)
            }
            None => {
                log::info!("no user data at {}, starting empty", self.path.display());
                Ok(UserDirectory::new())
            }
        }
    }

    async fn save(&self, directory: &UserDirectory) -> Result<(), StorageError> {
        let record = DirectoryRecord::from_directory(directory);
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.write_document(&record))
            .await
            .map_err(join)??;
        log::debug!("saved {} user(s) to {}", directory.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_core::model::UserAccount;

    #[tokio::test]
    async fn missing_file_loads_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GzipJsonRepository::new(dir.path().join("user_data.json.gz"));
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_file_is_gzip_json_in_legacy_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_data.json.gz");
        let repo = GzipJsonRepository::new(&path);

        let mut directory = UserDirectory::new();
        directory
            .insert_user("ada", UserAccount::new("digest"))
            .unwrap()
            .ensure_default_set();
        repo.save(&directory).await.unwrap();

        let mut json = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ada"]["password"], "digest");
        let python = &value["ada"]["flashcard_sets"]["Python (default)"];
        assert_eq!(python["category"], "Programming");
        assert_eq!(python["terms"]["Loop"]["total"], 0);
        assert_eq!(python["stats"]["percentage"], 0.0);

        assert_eq!(repo.load().await.unwrap(), directory);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_data.json.gz");
        {
            let mut gzip = GzEncoder::new(File::create(&path).unwrap(), Compression::fast());
            gzip.write_all(b"{not json").unwrap();
            gzip.finish().unwrap();
        }
        let err = GzipJsonRepository::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn saves_from_spawned_tasks_land_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GzipJsonRepository::new(dir.path().join("user_data.json.gz"));

        let mut directory = UserDirectory::new();
        directory.insert_user("ada", UserAccount::new("a")).unwrap();
        directory.insert_user("bob", UserAccount::new("b")).unwrap();

        let writer = repo.clone();
        let expected = directory.clone();
        tokio::spawn(async move { writer.save(&directory).await })
            .await
            .unwrap()
            .unwrap();

        let reader = repo.clone();
        let loaded = tokio::spawn(async move { reader.load().await })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, expected);
        assert!(!dir.path().join("user_data.json.tmp").exists());
    }
}
