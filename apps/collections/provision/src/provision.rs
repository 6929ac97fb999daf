//! Directory + guest collection creation, permission grants and the two batch drivers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use command_runner::{CommandResult, CommandRunner};

use crate::{
    config::CollectionMap,
    error::CollectionError,
    globus::GlobusCli,
    report::ItemReport,
};

/// Provisions guest collections under one parent collection.
#[derive(Debug)]
pub struct Provisioner<R> {
    globus: GlobusCli<R>,
    local_dir: PathBuf,
    share_dir: String,
    collection_id: String,
}

impl<R: CommandRunner> Provisioner<R> {
    /// `local_dir` is where sub directories are made, `share_dir` is the same
    /// place as seen from the parent collection `collection_id`.
    pub fn new(
        globus: GlobusCli<R>,
        local_dir: impl Into<PathBuf>,
        share_dir: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            globus,
            local_dir: local_dir.into(),
            share_dir: share_dir.into(),
            collection_id: collection_id.into(),
        }
    }

    /// The sharing service client.
    pub fn globus(&self) -> &GlobusCli<R> {
        &self.globus
    }

    /// Make `<local_dir>/<name>` if it is missing, then register
    /// `<share_dir>/<name>` as a guest collection called `name`.
    pub fn create_dir_collection(&self, name: &str) -> Result<String, CollectionError> {
        let path = self.local_dir.join(name);
        ensure_dir(&path)?;

        // The share path lives on the collection, not locally, so no path joining.
        let share_path = format!("{}/{}", self.share_dir, name);
        self.globus
            .create_guest_collection(&self.collection_id, &share_path, name)
    }

    /// Give `contact` read/write on `collection_id`, notifying their
    /// registered email. A failed lookup is returned as is.
    pub fn assign_privileges(&self, collection_id: &str, contact: &str) -> CommandResult {
        let email = match self.globus.resolve_email(contact) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(contact, error = %e, "could not resolve email");
                return e.into_result();
            }
        };
        self.globus.create_permission(collection_id, contact, &email)
    }

    /// Create one collection and, if that worked, grant `contact` access.
    pub fn process_collection(&self, name: &str, contact: &str) -> CommandResult {
        match self.create_dir_collection(name) {
            Ok(id) => {
                tracing::info!(collection = name, id = %id, "created guest collection");
                self.assign_privileges(&id, contact)
            }
            Err(e) => {
                tracing::warn!(collection = name, error = %e, "Cannot create collection {name}");
                e.into_result()
            }
        }
    }

    /// Create every collection in `map` and assign its contact. One report
    /// per entry, in map order. Nothing is rolled back.
    pub fn process_collections(&self, map: &CollectionMap) -> Vec<ItemReport> {
        map.iter()
            .map(|entry| ItemReport::new(entry, self.process_collection(&entry.name, &entry.contact)))
            .collect()
    }

    /// Grant every contact in `map` access to the parent collection itself.
    /// Names are ignored and nothing is created.
    pub fn process_permissions(&self, map: &CollectionMap) -> Vec<ItemReport> {
        tracing::info!("Processing permissions... {}", map.len());
        map.iter()
            .map(|entry| {
                tracing::info!(contact = %entry.contact, "processing");
                ItemReport::new(entry, self.assign_privileges(&self.collection_id, &entry.contact))
            })
            .collect()
    }
}

fn ensure_dir(path: &Path) -> Result<(), CollectionError> {
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| CollectionError::LocalDir {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "created local directory");
    Ok(())
}
