//! Ordered project list with live drag reorder and debounced order sync

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{matches_search, restore_record, take_record};
use crate::confirm::{ConfirmationGate, ConfirmationRequest, Severity};
use crate::error::{Error, Result};
use crate::models::{Collection, OrderUpdate, Project};
use crate::notify::NotificationChannel;
use crate::reorder::{move_item, IndexMove, Point, ReorderEngine, SlotLayout};
use crate::schedule::{DebouncedSyncScheduler, FlushTarget};
use crate::store::{records, RemoteStore};
use crate::util::lock;

const SYNCING_SEQUENCE: &str = "Syncing sequence to cloud...";
const SEQUENCE_UPDATED: &str = "Sequence updated";

/// Full ordering scheduled for one batched write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderBatch {
    /// Local move counter at the time the batch was built
    pub revision: u64,
    pub updates: Vec<OrderUpdate>,
}

struct BoardState {
    items: Vec<Project>,
    last_synced: Vec<String>,
    engine: ReorderEngine,
}

struct Shared<S> {
    store: Arc<S>,
    notifier: NotificationChannel,
    state: Mutex<BoardState>,
    revision: AtomicU64,
}

impl<S> Shared<S> {
    fn restore_synced_order(&self) {
        let mut state = lock(&self.state);
        let BoardState {
            items, last_synced, ..
        } = &mut *state;
        let rank = last_synced
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_str(), index))
            .collect::<HashMap<_, _>>();
        items.sort_by_key(|item| rank.get(item.id.as_str()).copied().unwrap_or(usize::MAX));
    }
}

/// Writes a reorder batch and reconciles the board with the outcome.
pub struct ReorderFlush<S> {
    shared: Arc<Shared<S>>,
}

impl<S: RemoteStore> FlushTarget<ReorderBatch> for ReorderFlush<S> {
    async fn flush(&self, batch: ReorderBatch) -> Result<()> {
        let shared = &self.shared;
        shared.notifier.loading(SYNCING_SEQUENCE);

        match shared
            .store
            .batch_update_orders(Collection::Projects, &batch.updates)
            .await
        {
            Ok(()) => {
                {
                    let mut state = lock(&shared.state);
                    let orders = batch
                        .updates
                        .iter()
                        .map(|update| (update.id.as_str(), update.order))
                        .collect::<HashMap<_, _>>();
                    for item in &mut state.items {
                        if let Some(order) = orders.get(item.id.as_str()) {
                            item.order = Some(*order);
                        }
                    }
                    state.last_synced = batch.updates.iter().map(|u| u.id.clone()).collect();
                }
                tracing::info!("Synced order of {} projects", batch.updates.len());
                shared.notifier.success(SEQUENCE_UPDATED);
                Ok(())
            }
            Err(error) => {
                if shared.revision.load(Ordering::SeqCst) == batch.revision {
                    tracing::warn!("Reorder sync failed, restoring last synced order");
                    shared.restore_synced_order();
                }
                shared
                    .notifier
                    .error(format!("Reorder sync failed: {error}"));
                Err(error)
            }
        }
    }
}

/// The ordered project collection of the dashboard.
///
/// The list is the single source of truth for rendering and is permuted in
/// place on every drag frame. Order writes are deferred through a
/// [`DebouncedSyncScheduler`].
pub struct ProjectBoard<S> {
    shared: Arc<Shared<S>>,
    scheduler: DebouncedSyncScheduler<ReorderBatch, ReorderFlush<S>>,
}

impl<S> Clone for ProjectBoard<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: RemoteStore> ProjectBoard<S> {
    pub fn new(
        store: Arc<S>,
        notifier: NotificationChannel,
        collision_threshold_px: f64,
        reorder_debounce: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            store,
            notifier,
            state: Mutex::new(BoardState {
                items: Vec::new(),
                last_synced: Vec::new(),
                engine: ReorderEngine::new(collision_threshold_px),
            }),
            revision: AtomicU64::new(0),
        });
        let scheduler = DebouncedSyncScheduler::new(
            ReorderFlush {
                shared: Arc::clone(&shared),
            },
            reorder_debounce,
        );
        Self { shared, scheduler }
    }

    /// Replace the local list with the stored projects, ascending by order.
    pub async fn load(&self) -> Result<usize> {
        let projects = records::list_ordered::<Project>(self.shared.store.as_ref()).await?;
        let count = projects.len();
        {
            let mut state = lock(&self.shared.state);
            state.last_synced = projects.iter().map(|p| p.id.clone()).collect();
            state.items = projects;
        }
        tracing::info!("Loaded {count} projects");
        Ok(count)
    }

    pub fn items(&self) -> Vec<Project> {
        lock(&self.shared.state).items.clone()
    }

    pub fn ids(&self) -> Vec<String> {
        lock(&self.shared.state)
            .items
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.state).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        lock(&self.shared.state)
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Projects whose title contains `search`, in display order.
    pub fn filtered(&self, search: &str) -> Vec<Project> {
        lock(&self.shared.state)
            .items
            .iter()
            .filter(|item| matches_search(*item, search))
            .cloned()
            .collect()
    }

    /// Ids in the order last confirmed by the store.
    pub fn last_synced_ids(&self) -> Vec<String> {
        lock(&self.shared.state).last_synced.clone()
    }

    pub fn begin_drag(&self, id: &str) -> Result<usize> {
        let mut state = lock(&self.shared.state);
        let BoardState { items, engine, .. } = &mut *state;
        engine.begin_drag(items, id)
    }

    /// Resolve one pointer frame; an applied move is scheduled for sync.
    pub fn drag_move(&self, layout: &SlotLayout, pointer: Point) -> Option<IndexMove> {
        let moved = {
            let mut state = lock(&self.shared.state);
            let BoardState { items, engine, .. } = &mut *state;
            engine.drag_move(items, layout, pointer)
        };
        if moved.is_some() {
            self.schedule_current();
        }
        moved
    }

    /// Finish the gesture. The live order is final and is scheduled for
    /// sync when it differs from the stored one.
    pub fn end_drag(&self) -> Option<String> {
        let (dragged, changed) = {
            let mut state = lock(&self.shared.state);
            let dragged = state.engine.end_drag();
            let changed = state
                .items
                .iter()
                .map(|item| item.id.as_str())
                .ne(state.last_synced.iter().map(String::as_str));
            (dragged, changed)
        };
        if dragged.is_some() && (changed || self.scheduler.is_pending()) {
            self.schedule_current();
        }
        dragged
    }

    /// Move a project to `index` without a pointer gesture.
    pub fn move_to(&self, id: &str, index: usize) -> Result<IndexMove> {
        let moved = {
            let mut state = lock(&self.shared.state);
            let from = state
                .items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            let to = index.min(state.items.len().saturating_sub(1));
            move_item(&mut state.items, from, to);
            IndexMove {
                id: id.to_string(),
                from,
                to,
            }
        };
        if moved.from != moved.to {
            self.schedule_current();
        }
        Ok(moved)
    }

    /// Persist a new project at the end of the collection.
    pub async fn create(&self, project: Project) -> Result<Project> {
        match records::create_ordered(self.shared.store.as_ref(), project).await {
            Ok(created) => {
                {
                    let mut state = lock(&self.shared.state);
                    state.last_synced.push(created.id.clone());
                    state.items.push(created.clone());
                }
                self.shared
                    .notifier
                    .success(format!("\"{}\" created", created.title));
                Ok(created)
            }
            Err(error) => {
                self.shared
                    .notifier
                    .error(format!("Create failed: {error}"));
                Err(error)
            }
        }
    }

    /// Save edited fields. The `order` is owned by the board: the edited
    /// copy's value is replaced locally and never written by a save.
    pub async fn save(&self, mut project: Project) -> Result<Project> {
        let previous = {
            let mut state = lock(&self.shared.state);
            let Some(slot) = state.items.iter_mut().find(|item| item.id == project.id) else {
                drop(state);
                let error = Error::NotFound(project.id.clone());
                self.shared.notifier.error(format!("Save failed: {error}"));
                return Err(error);
            };
            project.order = slot.order;
            std::mem::replace(slot, project.clone())
        };

        match records::update_content(self.shared.store.as_ref(), &project).await {
            Ok(()) => {
                tracing::info!("Saved project {}", project.id);
                self.shared.notifier.success("Project record saved");
                Ok(project)
            }
            Err(error) => {
                {
                    let mut state = lock(&self.shared.state);
                    if let Some(slot) = state.items.iter_mut().find(|item| item.id == project.id) {
                        let order = slot.order;
                        *slot = previous;
                        slot.order = order;
                    }
                }
                tracing::warn!("Save of project {} failed, local copy restored", project.id);
                self.shared.notifier.error(format!("Save failed: {error}"));
                Err(error)
            }
        }
    }

    /// Remove a project optimistically; the list is restored if the store
    /// rejects the delete.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let removed = take_record(&mut lock(&self.shared.state).items, id);
        let Some((index, project)) = removed else {
            return Err(Error::NotFound(id.to_string()));
        };

        match records::delete_record::<Project>(self.shared.store.as_ref(), id).await {
            Ok(()) => {
                lock(&self.shared.state).last_synced.retain(|synced| synced != id);
                // A scheduled or in-flight batch still names the deleted id
                if self.scheduler.is_pending() || self.scheduler.is_in_flight() {
                    self.schedule_current();
                }
                tracing::info!("Deleted project {id}");
                self.shared.notifier.success("Project record purged");
                Ok(())
            }
            Err(error) => {
                restore_record(&mut lock(&self.shared.state).items, index, project);
                tracing::warn!("Delete of project {id} failed, record restored");
                self.shared.notifier.error(format!("Delete failed: {error}"));
                Err(error)
            }
        }
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&self, gate: &ConfirmationGate, id: &str) -> Result<()> {
        let project = self
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let board = self.clone();
        let id = project.id.clone();
        gate.request(ConfirmationRequest::new(
            "Purge Project Record?",
            format!(
                "You are about to permanently delete \"{}\". This action is irreversible.",
                project.title
            ),
            Severity::Danger,
            move || async move { board.delete(&id).await },
        ));
        Ok(())
    }

    /// Write any scheduled order change now.
    pub async fn flush_pending(&self) -> Result<bool> {
        self.scheduler.flush_now().await
    }

    pub fn cancel_pending(&self) {
        self.scheduler.cancel();
    }

    pub fn has_pending_sync(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn is_syncing(&self) -> bool {
        self.scheduler.is_in_flight()
    }

    fn schedule_current(&self) {
        let revision = self.shared.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let updates = OrderUpdate::from_display_order(&lock(&self.shared.state).items);
        self.scheduler.schedule(ReorderBatch { revision, updates });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;
    use crate::store::{MemoryStore, StoreOperation};
    use pretty_assertions::assert_eq;
    use tokio::time::sleep;

    fn project(id: &str, order: i64) -> Project {
        Project {
            title: format!("Project {id}"),
            order: Some(order),
            ..Project::with_id(id)
        }
    }

    async fn board_with(ids: &[&str]) -> (ProjectBoard<MemoryStore>, MemoryStore, NotificationChannel) {
        let store = MemoryStore::new();
        let seeded = ids
            .iter()
            .zip(0_i64..)
            .map(|(id, order)| project(id, order))
            .collect::<Vec<_>>();
        store.seed(&seeded).unwrap();

        let notifier = NotificationChannel::default();
        let board = ProjectBoard::new(
            Arc::new(store.clone()),
            notifier.clone(),
            60.0,
            Duration::from_millis(2000),
        );
        board.load().await.unwrap();
        (board, store, notifier)
    }

    fn orders(board: &ProjectBoard<MemoryStore>) -> Vec<(String, Option<i64>)> {
        board
            .items()
            .into_iter()
            .map(|item| (item.id, item.order))
            .collect()
    }

    fn layout(count: usize) -> SlotLayout {
        SlotLayout::grid(count, 3, (200.0, 150.0), 16.0, true)
    }

    fn update(id: &str, order: i64) -> OrderUpdate {
        OrderUpdate {
            id: id.to_string(),
            order,
        }
    }

    #[tokio::test]
    async fn load_sorts_missing_order_last() {
        let store = MemoryStore::new();
        store
            .seed(&[project("b", 1), Project::with_id("x"), project("a", 0)])
            .unwrap();
        let board = ProjectBoard::new(
            Arc::new(store),
            NotificationChannel::default(),
            60.0,
            Duration::from_millis(2000),
        );
        assert_eq!(board.load().await.unwrap(), 3);
        assert_eq!(board.ids(), vec!["a", "b", "x"]);
    }

    #[tokio::test(start_paused = true)]
    async fn drag_frames_flush_one_batch_after_quiet_period() {
        let (board, store, notifier) = board_with(&["A", "B", "C"]).await;
        let layout = layout(3);

        board.begin_drag("C").unwrap();
        board.drag_move(&layout, layout.items[1].center());
        sleep(Duration::from_millis(16)).await;
        board.drag_move(&layout, layout.items[0].center());
        sleep(Duration::from_millis(16)).await;
        board.drag_move(&layout, layout.items[0].center());
        board.end_drag();
        assert_eq!(board.ids(), vec!["C", "A", "B"]);
        assert!(store.batch_writes().is_empty());

        sleep(Duration::from_millis(2100)).await;
        assert_eq!(
            store.batch_writes(),
            vec![(
                Collection::Projects,
                vec![update("C", 0), update("A", 1), update("B", 2)]
            )]
        );
        assert_eq!(
            orders(&board),
            vec![
                ("C".to_string(), Some(0)),
                ("A".to_string(), Some(1)),
                ("B".to_string(), Some(2))
            ]
        );
        assert_eq!(board.last_synced_ids(), vec!["C", "A", "B"]);
        assert_eq!(
            notifier.current().map(|n| n.message),
            Some(SEQUENCE_UPDATED.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sync_shows_loading_while_in_flight() {
        let store = MemoryStore::new();
        store.seed(&[project("A", 0), project("B", 1)]).unwrap();
        let notifier = NotificationChannel::default();
        let board = ProjectBoard::new(
            Arc::new(store.with_latency(Duration::from_millis(500))),
            notifier.clone(),
            60.0,
            Duration::from_millis(2000),
        );
        board.load().await.unwrap();

        board.move_to("B", 0).unwrap();
        sleep(Duration::from_millis(2200)).await;
        assert!(board.is_syncing());
        assert_eq!(
            notifier.current().map(|n| n.kind),
            Some(NotificationKind::Loading)
        );

        sleep(Duration::from_millis(500)).await;
        assert!(!board.is_syncing());
        assert_eq!(board.last_synced_ids(), vec!["B", "A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reorder_rolls_back_to_last_synced() {
        let (board, store, notifier) = board_with(&["A", "B", "C"]).await;
        store.fail_next(StoreOperation::BatchUpdateOrders, "quota exceeded");

        board.move_to("C", 0).unwrap();
        assert_eq!(board.ids(), vec!["C", "A", "B"]);

        assert!(board.flush_pending().await.is_err());
        assert_eq!(board.ids(), vec!["A", "B", "C"]);
        let current = notifier.current().unwrap();
        assert_eq!(current.kind, NotificationKind::Error);
        assert!(current.message.contains("quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reorder_keeps_newer_local_order() {
        let (board, store, _) = board_with(&["A", "B", "C"]).await;
        let board = ProjectBoard::new(
            Arc::new(store.clone().with_latency(Duration::from_millis(1000))),
            NotificationChannel::default(),
            60.0,
            Duration::from_millis(2000),
        );
        board.load().await.unwrap();
        store.fail_next(StoreOperation::BatchUpdateOrders, "offline");

        board.move_to("C", 0).unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert!(board.is_syncing());
        board.move_to("B", 0).unwrap();

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(board.ids(), vec!["B", "C", "A"]);
        assert!(board.has_pending_sync());
    }

    #[tokio::test(start_paused = true)]
    async fn drag_without_movement_writes_nothing() {
        let (board, store, _) = board_with(&["A", "B", "C"]).await;
        let layout = layout(3);

        board.begin_drag("B").unwrap();
        let own = layout.items[1];
        assert_eq!(board.drag_move(&layout, own.center()), None);
        assert_eq!(board.drag_move(&layout, Point::new(own.x + 5.0, own.y + 5.0)), None);
        assert_eq!(board.end_drag().as_deref(), Some("B"));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(board.ids(), vec!["A", "B", "C"]);
        assert!(store.batch_writes().is_empty());
    }

    #[tokio::test]
    async fn delete_failure_restores_list() {
        let (board, store, notifier) = board_with(&["p1", "p2"]).await;
        store.fail_next(StoreOperation::Delete, "permission denied");

        let before = orders(&board);
        let result = board.delete("p1").await;

        assert!(result.is_err());
        assert_eq!(orders(&board), before);
        assert_eq!(
            before,
            vec![("p1".to_string(), Some(0)), ("p2".to_string(), Some(1))]
        );
        assert_eq!(
            notifier.current().map(|n| n.kind),
            Some(NotificationKind::Error)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn delete_is_optimistic() {
        let store = MemoryStore::new();
        store.seed(&[project("p1", 0), project("p2", 1)]).unwrap();
        let store = store.with_latency(Duration::from_millis(300));
        let board = ProjectBoard::new(
            Arc::new(store.clone()),
            NotificationChannel::default(),
            60.0,
            Duration::from_millis(2000),
        );
        board.load().await.unwrap();

        let deleting = {
            let board = board.clone();
            tokio::spawn(async move { board.delete("p1").await })
        };
        sleep(Duration::from_millis(100)).await;
        assert_eq!(orders(&board), vec![("p2".to_string(), Some(1))]);

        deleting.await.unwrap().unwrap();
        assert_eq!(orders(&board), vec![("p2".to_string(), Some(1))]);
        assert!(store.document(Collection::Projects, "p1").is_none());
    }

    #[tokio::test]
    async fn confirmed_delete_goes_through_gate() {
        let (board, store, _) = board_with(&["p1", "p2"]).await;
        let gate = ConfirmationGate::new();

        board.request_delete(&gate, "p1").unwrap();
        let prompt = gate.active().unwrap();
        assert_eq!(prompt.title, "Purge Project Record?");
        assert_eq!(prompt.severity, Severity::Danger);
        assert_eq!(board.len(), 2);

        assert!(gate.accept().await.unwrap());
        assert_eq!(board.ids(), vec!["p2"]);
        assert!(store.document(Collection::Projects, "p1").is_none());
    }

    #[tokio::test]
    async fn create_appends_with_next_order() {
        let (board, _, notifier) = board_with(&["p1", "p2"]).await;
        let created = board.create(Project::with_id("p3")).await.unwrap();

        assert_eq!(created.order, Some(2));
        assert_eq!(board.ids(), vec!["p1", "p2", "p3"]);
        assert_eq!(
            notifier.current().map(|n| n.kind),
            Some(NotificationKind::Success)
        );
    }

    #[tokio::test]
    async fn create_failure_inserts_nothing() {
        let (board, store, _) = board_with(&["p1"]).await;
        store.fail_next(StoreOperation::Set, "offline");
        assert!(board.create(Project::with_id("p2")).await.is_err());
        assert_eq!(board.ids(), vec!["p1"]);
    }

    #[tokio::test]
    async fn save_keeps_board_order_and_rolls_back_on_failure() {
        let (board, store, _) = board_with(&["p1", "p2"]).await;

        let mut edited = board.get("p2").unwrap();
        edited.title = "Renamed".to_string();
        edited.order = Some(99);
        let saved = board.save(edited.clone()).await.unwrap();
        assert_eq!(saved.order, Some(1));
        assert_eq!(store.document(Collection::Projects, "p2").unwrap()["order"], 1);

        store.fail_next(StoreOperation::Update, "offline");
        edited.title = "Lost".to_string();
        assert!(board.save(edited).await.is_err());
        assert_eq!(board.get("p2").unwrap().title, "Renamed");
    }

    #[tokio::test(start_paused = true)]
    async fn delete_during_pending_reorder_keeps_new_order() {
        let (board, store, notifier) = board_with(&["A", "B", "C"]).await;

        board.move_to("C", 0).unwrap();
        board.delete("A").await.unwrap();
        assert!(board.has_pending_sync());

        sleep(Duration::from_millis(2100)).await;
        assert_eq!(board.ids(), vec!["C", "B"]);
        assert_eq!(board.last_synced_ids(), vec!["C", "B"]);
        assert_eq!(
            store.batch_writes(),
            vec![(Collection::Projects, vec![update("C", 0), update("B", 1)])]
        );
        assert_eq!(store.document(Collection::Projects, "C").unwrap()["order"], 0);
        assert_eq!(store.document(Collection::Projects, "B").unwrap()["order"], 1);

        let current = notifier.current().unwrap();
        assert_eq!(current.kind, NotificationKind::Success);
        assert_eq!(current.message, SEQUENCE_UPDATED);
    }

    #[tokio::test(start_paused = true)]
    async fn save_during_in_flight_reorder_keeps_synced_order() {
        let store = MemoryStore::new();
        store.seed(&[project("A", 0), project("B", 1)]).unwrap();
        let board = ProjectBoard::new(
            Arc::new(store.clone().with_latency(Duration::from_millis(500))),
            NotificationChannel::default(),
            60.0,
            Duration::from_millis(2000),
        );
        board.load().await.unwrap();

        board.move_to("B", 0).unwrap();
        sleep(Duration::from_millis(2100)).await;
        assert!(board.is_syncing());

        let mut renamed = board.get("B").unwrap();
        renamed.title = "Renamed".to_string();
        board.save(renamed).await.unwrap();
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(board.last_synced_ids(), vec!["B", "A"]);
        let stored_b = store.document(Collection::Projects, "B").unwrap();
        assert_eq!(stored_b["title"], "Renamed");
        assert_eq!(stored_b["order"], 0);
        assert_eq!(store.document(Collection::Projects, "A").unwrap()["order"], 1);
        assert_eq!(
            orders(&board),
            vec![("B".to_string(), Some(0)), ("A".to_string(), Some(1))]
        );
    }

    #[tokio::test]
    async fn filtered_matches_titles() {
        let (board, _, _) = board_with(&["p1", "p2"]).await;
        let hits = board.filtered("project P2");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p2");
    }
}
