use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{NewSponsor, Session, Sponsor, SponsorId, UserId};
use storage::SponsorStore;

/// In-memory store whose failures are switched on per operation, with call
/// counters for asserting which requests actually went out.
#[derive(Default)]
pub(crate) struct ScriptedStore {
    rows: Mutex<Vec<Sponsor>>,
    fail_list: Mutex<bool>,
    fail_writes: Mutex<bool>,
    next_id: AtomicUsize,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) insert_calls: AtomicUsize,
    pub(crate) delete_calls: AtomicUsize,
    pub(crate) inserted: Mutex<Vec<NewSponsor>>,
}

impl ScriptedStore {
    pub(crate) fn with_rows(rows: Vec<Sponsor>) -> Self {
        let store = Self::default();
        *store.rows.lock().expect("rows") = rows;
        store
    }

    pub(crate) fn failing_reads() -> Self {
        let store = Self::default();
        store.set_fail_list(true);
        store
    }

    pub(crate) fn set_fail_list(&self, fail: bool) {
        *self.fail_list.lock().expect("flag") = fail;
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().expect("flag") = fail;
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SponsorStore for ScriptedStore {
    async fn list_sponsors(&self) -> Result<Vec<Sponsor>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.lock().expect("flag") {
            return Err(anyhow!("connection refused"));
        }
        let mut rows = self.rows.lock().expect("rows").clone();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn insert_sponsor(&self, _session: &Session, sponsor: &NewSponsor) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_writes.lock().expect("flag") {
            return Err(anyhow!("insert rejected"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.inserted.lock().expect("inserted").push(sponsor.clone());
        self.rows.lock().expect("rows").push(Sponsor {
            id: Some(SponsorId(format!("sp-{id}"))),
            title: sponsor.title.clone(),
            image: sponsor.image.clone(),
            location: sponsor.location.clone(),
            maplink: sponsor.maplink.clone(),
            text: sponsor.text.clone(),
            websitelink: sponsor.websitelink.clone(),
            created_at: None,
        });
        Ok(())
    }

    async fn delete_sponsor(&self, _session: &Session, id: &SponsorId) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_writes.lock().expect("flag") {
            return Err(anyhow!("delete rejected"));
        }
        self.rows
            .lock()
            .expect("rows")
            .retain(|row| row.id.as_ref() != Some(id));
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn stored(id: &str, title: &str) -> Sponsor {
    Sponsor {
        id: Some(SponsorId::from(id)),
        title: title.to_string(),
        image: format!("https://cdn.example/{id}.png"),
        location: "Kelowna".into(),
        maplink: format!("https://maps.example/{id}"),
        text: "10% off for KDT members!".into(),
        websitelink: format!("https://{id}.example"),
        created_at: None,
    }
}

pub(crate) fn admin_session() -> Session {
    Session {
        user_id: UserId::from("admin-7"),
        email: Some("exec@kdt.example".into()),
        access_token: "jwt".into(),
    }
}
