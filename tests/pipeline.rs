use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anime_notifier::errors::{DeliveryError, DeliveryResult, SourceError, SourceResult};
use anime_notifier::history::HistoryStore;
use anime_notifier::models::{Detail, Entry};
use anime_notifier::notifier::{DeliveryOutcome, Notifier};
use anime_notifier::poller::{CycleOutcome, NoChangeReason, Poller, Scheduler};
use anime_notifier::sources::{DetailFetcher, ListingExtractor};

const SOURCE: &str = "https://example.org/anime-moi/";

#[derive(Default)]
struct FakeListing {
    entries: Mutex<Vec<Entry>>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeListing {
    fn serving(entries: Vec<Entry>) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(entries),
            ..Self::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    fn set(&self, entries: Vec<Entry>) {
        *self.entries.lock().unwrap() = entries;
    }
}

#[async_trait]
impl ListingExtractor for FakeListing {
    async fn try_extract(&self, url: &str) -> SourceResult<Vec<Entry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(SourceError::timeout(url));
        }
        Ok(self.entries.lock().unwrap().clone())
    }
}

struct FakeDetail {
    fail: bool,
}

#[async_trait]
impl DetailFetcher for FakeDetail {
    async fn try_fetch_detail(&self, link: &str) -> SourceResult<Detail> {
        if self.fail {
            return Err(SourceError::Http {
                status: 404,
                url: link.to_string(),
            });
        }
        Ok(Detail {
            description: "An elf mage outlives her party.".to_string(),
            background_image: "https://cdn.example.org/bg.jpg".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Entry>>,
    fail: bool,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Entry> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, entry: &Entry) -> DeliveryResult<()> {
        self.sent.lock().unwrap().push(entry.clone());
        if self.fail {
            return Err(DeliveryError::Http {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

fn episode(link: &str, episode: &str) -> Entry {
    let mut entry = Entry::new("Sousou no Frieren", episode, link).unwrap();
    entry.image = Some("https://cdn.example.org/thumb.jpg".to_string());
    entry.genres = "Fantasy, Adventure".to_string();
    entry
}

struct Harness {
    _dir: tempfile::TempDir,
    history_path: std::path::PathBuf,
    listing: Arc<FakeListing>,
    notifier: Arc<RecordingNotifier>,
    poller: Poller,
}

fn harness(listing: Arc<FakeListing>, detail_fails: bool, delivery_fails: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let history_path = dir.path().join("AnimeVnSub.json");
    let history = HistoryStore::load(&history_path, 30).unwrap();
    let notifier = Arc::new(RecordingNotifier {
        fail: delivery_fails,
        ..RecordingNotifier::default()
    });

    let poller = Poller::new(
        SOURCE.to_string(),
        listing.clone(),
        Arc::new(FakeDetail { fail: detail_fails }),
        notifier.clone(),
        history,
    );

    Harness {
        _dir: dir,
        history_path,
        listing,
        notifier,
        poller,
    }
}

#[tokio::test]
async fn test_same_listing_twice_notifies_once() {
    let listing = FakeListing::serving(vec![
        episode("https://example.org/phim/frieren/", "12"),
        episode("https://example.org/phim/frieren/", "11"),
    ]);
    let mut h = harness(listing, false, false);

    let first = h.poller.run_cycle().await;
    let CycleOutcome::NewEntry { entry, delivery, persisted } = first else {
        panic!("expected a new entry");
    };
    assert_eq!(entry.episode(), "12");
    assert_eq!(entry.description.as_deref(), Some("An elf mage outlives her party."));
    assert_eq!(entry.background_image.as_deref(), Some("https://cdn.example.org/bg.jpg"));
    assert_eq!(delivery, DeliveryOutcome::Delivered);
    assert!(persisted);

    let second = h.poller.run_cycle().await;
    assert_eq!(second, CycleOutcome::NoChange(NoChangeReason::AlreadyKnown));

    assert_eq!(h.notifier.sent().len(), 1);
    assert_eq!(h.poller.history().entries(SOURCE).len(), 1);
}

#[tokio::test]
async fn test_query_string_variant_is_the_same_episode() {
    let listing = FakeListing::serving(vec![episode("https://example.org/phim/frieren/?ref=home", "12")]);
    let mut h = harness(listing, false, false);

    h.poller.run_cycle().await;
    h.listing
        .set(vec![episode("https://example.org/phim/frieren/?utm_source=feed", "12")]);
    let outcome = h.poller.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::NoChange(NoChangeReason::AlreadyKnown));
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_same_link_new_episode_is_notified() {
    let listing = FakeListing::serving(vec![episode("https://example.org/phim/frieren/", "12")]);
    let mut h = harness(listing, false, false);

    h.poller.run_cycle().await;
    h.listing
        .set(vec![episode("https://example.org/phim/frieren/", "13")]);
    let outcome = h.poller.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::NewEntry { .. }));
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].episode(), "13");

    let history = h.poller.history().entries(SOURCE);
    assert_eq!(history[0].episode(), "13");
    assert_eq!(history[1].episode(), "12");
}

#[tokio::test]
async fn test_listing_failure_changes_nothing() {
    let mut h = harness(FakeListing::failing(), false, false);

    let outcome = h.poller.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::NoChange(NoChangeReason::EmptyListing));
    assert!(h.notifier.sent().is_empty());
    assert!(h.poller.history().records().is_empty());
    assert!(!h.history_path.exists());
}

#[tokio::test]
async fn test_detail_failure_still_notifies_and_records() {
    let listing = FakeListing::serving(vec![episode("https://example.org/phim/frieren/", "12")]);
    let mut h = harness(listing, true, false);

    let outcome = h.poller.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::NewEntry { persisted: true, .. }));
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].description.as_deref(), Some(""));
    assert_eq!(sent[0].background_image.as_deref(), Some(""));
    assert_eq!(h.poller.history().entries(SOURCE).len(), 1);
}

#[tokio::test]
async fn test_delivery_failure_is_recorded_and_not_retried() {
    let listing = FakeListing::serving(vec![episode("https://example.org/phim/frieren/", "12")]);
    let mut h = harness(listing, false, true);

    let first = h.poller.run_cycle().await;
    let CycleOutcome::NewEntry { delivery, persisted, .. } = first else {
        panic!("expected a new entry");
    };
    assert!(!delivery.is_delivered());
    assert!(persisted);

    let second = h.poller.run_cycle().await;
    assert_eq!(second, CycleOutcome::NoChange(NoChangeReason::AlreadyKnown));
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_history_survives_restart() {
    let listing = FakeListing::serving(vec![episode("https://example.org/phim/frieren/", "12")]);
    let mut h = harness(listing.clone(), false, false);
    h.poller.run_cycle().await;

    let reloaded = HistoryStore::load(&h.history_path, 30).unwrap();
    assert_eq!(reloaded.records(), h.poller.history().records());

    let notifier = Arc::new(RecordingNotifier::default());
    let mut restarted = Poller::new(
        SOURCE.to_string(),
        listing,
        Arc::new(FakeDetail { fail: false }),
        notifier.clone(),
        reloaded,
    );

    let outcome = restarted.run_cycle().await;
    assert_eq!(outcome, CycleOutcome::NoChange(NoChangeReason::AlreadyKnown));
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_scheduler_runs_immediately_and_repeats() {
    let listing = FakeListing::serving(vec![episode("https://example.org/phim/frieren/", "12")]);
    let h = harness(listing, false, false);

    let scheduler = Scheduler::new(h.poller, Duration::from_millis(20));
    let poller = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(150)))
        .await;

    assert!(h.listing.calls.load(Ordering::SeqCst) >= 2);
    assert_eq!(h.notifier.sent().len(), 1);
    assert_eq!(poller.history().entries(SOURCE).len(), 1);
}

#[tokio::test]
async fn test_scheduler_never_overlaps_slow_cycles() {
    let listing = Arc::new(FakeListing {
        entries: Mutex::new(vec![episode("https://example.org/phim/frieren/", "12")]),
        delay: Some(Duration::from_millis(30)),
        ..FakeListing::default()
    });
    let h = harness(listing, false, false);

    let scheduler = Scheduler::new(h.poller, Duration::from_millis(5));
    scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(200)))
        .await;

    assert!(h.listing.calls.load(Ordering::SeqCst) >= 2);
    assert_eq!(h.listing.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(h.notifier.sent().len(), 1);
}
