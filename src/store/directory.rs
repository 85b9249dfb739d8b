// src/store/directory.rs — In-memory user directory over the durable store
//
// The first lookup bulk-loads every stored row into the map (the user
// population is small); afterwards reads never touch storage. Writes go
// through to the row immediately, so map and store agree after every
// save/create.

use std::collections::HashMap;

use tracing::debug;

use crate::bot::session::UserSession;
use crate::store::store::Store;

pub struct UserDirectory {
    store: Store,
    cache: HashMap<i64, UserSession>,
    loaded: bool,
}

impl UserDirectory {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            cache: HashMap::new(),
            loaded: false,
        }
    }

    fn ensure_loaded(&mut self) -> anyhow::Result<()> {
        if self.loaded {
            return Ok(());
        }
        for session in self.store.fetch_all_users()? {
            self.cache.insert(session.id, session);
        }
        debug!("Loaded {} user session(s) from storage", self.cache.len());
        self.loaded = true;
        Ok(())
    }

    /// Look up a session by identity. Returns a clone; pass the mutated
    /// session back through `save`.
    pub fn get(&mut self, id: i64) -> anyhow::Result<Option<UserSession>> {
        self.ensure_loaded()?;
        Ok(self.cache.get(&id).cloned())
    }

    /// Insert a brand-new session. Called exactly once per identity, on
    /// first-ever contact.
    pub fn create(&mut self, session: UserSession) -> anyhow::Result<()> {
        self.ensure_loaded()?;
        self.store.insert_user(&session)?;
        self.cache.insert(session.id, session);
        Ok(())
    }

    /// Write-through save of a mutated session.
    pub fn save(&mut self, session: &UserSession) -> anyhow::Result<()> {
        self.ensure_loaded()?;
        self.store.update_user(session)?;
        self.cache.insert(session.id, session.clone());
        Ok(())
    }
}
