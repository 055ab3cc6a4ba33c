use super::*;
use crate::test_support::{stored, ScriptedStore};
use shared::{
    domain::{NewSponsor, Session},
    notify::NotificationLog,
    protocol::NotificationLevel,
};
use crate::{AuthContext, SponsorsPageView};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::Notify;

/// A store whose reads never answer.
struct HangingStore;

#[async_trait::async_trait]
impl SponsorStore for HangingStore {
    async fn list_sponsors(&self) -> anyhow::Result<Vec<Sponsor>> {
        std::future::pending().await
    }

    async fn insert_sponsor(&self, _session: &Session, _sponsor: &NewSponsor) -> anyhow::Result<()> {
        std::future::pending().await
    }

    async fn delete_sponsor(&self, _session: &Session, _id: &SponsorId) -> anyhow::Result<()> {
        std::future::pending().await
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Holds the first read until `release` is called; later reads answer at once.
#[derive(Default)]
struct GatedStore {
    reads: AtomicUsize,
    gate: Notify,
}

impl GatedStore {
    fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait::async_trait]
impl SponsorStore for GatedStore {
    async fn list_sponsors(&self) -> anyhow::Result<Vec<Sponsor>> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            self.gate.notified().await;
        }
        Ok(vec![stored("a", "Alpha Bakery")])
    }

    async fn insert_sponsor(&self, _session: &Session, _sponsor: &NewSponsor) -> anyhow::Result<()> {
        Ok(())
    }

    async fn delete_sponsor(&self, _session: &Session, _id: &SponsorId) -> anyhow::Result<()> {
        Ok(())
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

const FALLBACK_TITLES: [&str; 5] = [
    "Seoulful Convenience",
    "Macao Imperial Tea",
    "Tossing Pizzeria",
    "Bubble Waffle Cafe",
    "Formosa Tea Cafe",
];

fn titles(snapshot: &SponsorListSnapshot) -> Vec<String> {
    snapshot.sponsors.iter().map(|s| s.title.clone()).collect()
}

#[test]
fn starts_empty_and_loading() {
    let controller = SponsorListController::new(Arc::new(ScriptedStore::default()));
    let snapshot = controller.snapshot();
    assert!(snapshot.loading);
    assert!(snapshot.sponsors.is_empty());
    assert_eq!(snapshot.source, ListSource::Pending);
}

#[tokio::test]
async fn stored_rows_replace_the_list_in_title_order() {
    let store = Arc::new(ScriptedStore::with_rows(vec![
        stored("b", "Tossing Pizzeria"),
        stored("a", "Bubble Waffle Cafe"),
    ]));
    let controller = SponsorListController::new(store.clone());
    let log = NotificationLog::new();

    let snapshot = controller.load(&log).await;

    assert_eq!(titles(&snapshot), vec!["Bubble Waffle Cafe", "Tossing Pizzeria"]);
    assert_eq!(snapshot.source, ListSource::Remote);
    assert!(!snapshot.loading);
    assert!(log.is_empty());
    assert_eq!(store.list_calls(), 1);
}

#[tokio::test]
async fn empty_store_shows_the_five_default_sponsors() {
    let controller = SponsorListController::new(Arc::new(ScriptedStore::default()));
    let log = NotificationLog::new();

    let snapshot = controller.load(&log).await;

    assert_eq!(titles(&snapshot), FALLBACK_TITLES);
    assert!(snapshot.sponsors.iter().all(|s| s.id.is_none()));
    assert_eq!(snapshot.source, ListSource::Fallback);
    assert!(!snapshot.loading);
    assert!(log.is_empty(), "an empty store is not a failure");
}

#[tokio::test]
async fn read_failure_shows_defaults_and_warns_once() {
    let controller = SponsorListController::new(Arc::new(ScriptedStore::failing_reads()));
    let log = NotificationLog::new();

    let snapshot = controller.load(&log).await;

    assert_eq!(titles(&snapshot), FALLBACK_TITLES);
    assert!(!snapshot.loading);
    let notes = log.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].title, LOAD_FAILED);
}

#[tokio::test]
async fn fallback_replaces_previous_rows_wholesale() {
    let store = Arc::new(ScriptedStore::with_rows(vec![stored("a", "Alpha Bakery")]));
    let controller = SponsorListController::new(store.clone());
    let log = NotificationLog::new();
    controller.load(&log).await;

    store.set_fail_list(true);
    let snapshot = controller.load(&log).await;

    assert_eq!(titles(&snapshot), FALLBACK_TITLES);
    assert!(!titles(&snapshot).contains(&"Alpha Bakery".to_string()));
}

#[tokio::test]
async fn repeated_loads_over_unchanged_store_are_identical() {
    let store = Arc::new(ScriptedStore::with_rows(vec![
        stored("x", "Macao Imperial Tea"),
        stored("y", "Formosa Tea Cafe"),
    ]));
    let controller = SponsorListController::new(store);
    let log = NotificationLog::new();

    let first = controller.load(&log).await;
    let second = controller.load(&log).await;

    assert_eq!(*first.sponsors, *second.sponsors);
    assert_eq!(first.source, second.source);
}

#[tokio::test]
async fn find_only_matches_cached_ids() {
    let store = Arc::new(ScriptedStore::with_rows(vec![stored("a", "Alpha Bakery")]));
    let controller = SponsorListController::new(store);
    controller.load(&NotificationLog::new()).await;

    assert_eq!(
        controller
            .find(&SponsorId::from("a"))
            .map(|s| s.title),
        Some("Alpha Bakery".to_string())
    );
    assert!(controller.find(&SponsorId::from("zzz")).is_none());
}

#[tokio::test]
async fn abandoned_load_still_clears_loading() {
    let controller = SponsorListController::new(Arc::new(HangingStore));
    let log = NotificationLog::new();

    {
        let load = controller.load(&log);
        tokio::pin!(load);
        tokio::select! {
            _ = &mut load => panic!("hanging store answered"),
            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
        assert!(controller.snapshot().loading);
    }

    let snapshot = controller.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.source, ListSource::Pending);
}

#[tokio::test]
async fn finished_load_is_not_loading_while_another_is_pending() {
    let store = Arc::new(GatedStore::default());
    let controller = SponsorListController::new(store.clone());
    let log = NotificationLog::new();

    let first = controller.load(&log);
    tokio::pin!(first);
    tokio::select! {
        _ = &mut first => panic!("gated read answered"),
        _ = tokio::time::sleep(Duration::from_millis(20)) => {}
    }

    let second = controller.load(&log).await;
    assert!(!second.loading);
    assert_eq!(titles(&second), vec!["Alpha Bakery"]);
    let page = SponsorsPageView::build(&second, &AuthContext::anonymous());
    assert_eq!(page.cards.len(), 1);

    assert!(controller.snapshot().loading, "first load is still pending");
    assert!(!controller.settled().loading);

    store.release();
    let first = first.await;
    assert!(!first.loading);
    assert!(!controller.snapshot().loading);
    assert_eq!(store.reads.load(Ordering::SeqCst), 2);
}

#[test]
fn settled_is_loading_only_before_any_list_arrives() {
    let controller = SponsorListController::new(Arc::new(ScriptedStore::default()));
    let settled = controller.settled();
    assert!(settled.loading);
    assert_eq!(settled.source, ListSource::Pending);
}
