#![forbid(unsafe_code)]

//! The board: one document, its history, its view, and the glue between.
//!
//! Every user-facing operation runs the same pipeline:
//!
//! ```text
//! mutate Document ─▶ reconcile view ─▶ push history (if significant) ─▶ persist
//! ```
//!
//! Operations that cannot apply (unknown id, swap at an edge, unchanged
//! value) decline: they return `false`/`None` and touch neither history nor
//! storage.
//!
//! # Deferred work
//!
//! [`BoardTask`]s run from [`Board::tick`] on the injected clock. The
//! autosave task reschedules itself; a press on a drag handle schedules
//! [`BoardTask::ArmDrag`], and releasing before it fires cancels it and
//! toggles the item instead.
//!
//! # Drags
//!
//! A live drag only moves rows in the view. Before any other operation runs,
//! an active drag is settled as if the pointer had been released, so the
//! document and view never disagree outside a gesture.

use chrono::NaiveDateTime;
use notepin_core::keymap::resolve;
use notepin_core::{
    Command, Direction, Document, EditContext, IdAllocator, Item, ItemId, KeyChord, Mode,
    VisibilityMode, WindowGeometry,
};
use notepin_runtime::{
    Clock, HistoryConfig, HistoryStore, LoadSource, Loaded, PersistenceGateway, RuntimeConfig,
    Scheduler, StorageBackend, StorageError, TaskId,
};
use notepin_widgets::focus::{self, Caret, FocusTarget};
use notepin_widgets::{DragOutcome, DragReorderController, Reconciler, Reconciliation, ViewHost};
use web_time::Duration;

/// Deferred work owned by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardTask {
    /// Periodic save without a history entry.
    Autosave,
    /// Long press elapsed on this item's handle; start dragging it.
    ArmDrag(ItemId),
}

/// Board timing and history settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardOptions {
    pub autosave_interval: Duration,
    pub long_press: Duration,
    pub history: HistoryConfig,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}

impl BoardOptions {
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            autosave_interval: config.autosave_interval(),
            long_press: config.long_press(),
            history: config.history(),
        }
    }
}

/// What releasing a drag handle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleRelease {
    /// Released before the long press elapsed; completion flipped to the value.
    Toggled(bool),
    /// Released at the end of a drag.
    Dropped(DragOutcome),
    /// No press or drag was in progress for this handle.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct PendingPress {
    id: ItemId,
    task: TaskId,
}

/// Orchestrates one document and everything attached to it.
pub struct Board<B, H> {
    document: Document,
    history: HistoryStore<Document>,
    reconciler: Reconciler,
    drag: DragReorderController,
    scheduler: Scheduler<BoardTask>,
    gateway: PersistenceGateway<B>,
    host: H,
    clock: Box<dyn Clock>,
    ids: IdAllocator,
    focus: Option<FocusTarget>,
    press: Option<PendingPress>,
    load_source: LoadSource,
    options: BoardOptions,
}

fn now_stamp() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

impl<B: StorageBackend, H: ViewHost> Board<B, H> {
    /// Load from `backend`, render into `host`, and record the loaded state
    /// as the history baseline. Unreadable stored data falls back to an
    /// empty document.
    pub fn open(backend: B, host: H, clock: impl Clock + 'static, options: BoardOptions) -> Self {
        let gateway = PersistenceGateway::new(backend);
        let loaded = gateway.load_report();
        Self::assemble(gateway, loaded, host, Box::new(clock), options)
    }

    /// Like [`open`](Self::open), but a backend read failure is returned
    /// instead of replaced by defaults.
    pub fn try_open(
        backend: B,
        host: H,
        clock: impl Clock + 'static,
        options: BoardOptions,
    ) -> Result<Self, StorageError> {
        let gateway = PersistenceGateway::new(backend);
        let loaded = gateway.try_load_report()?;
        Ok(Self::assemble(gateway, loaded, host, Box::new(clock), options))
    }

    fn assemble(
        gateway: PersistenceGateway<B>,
        loaded: Loaded,
        host: H,
        clock: Box<dyn Clock>,
        options: BoardOptions,
    ) -> Self {
        let document = loaded.document;
        let mut board = Self {
            ids: IdAllocator::seeded_from(&document),
            document,
            history: HistoryStore::new(options.history),
            reconciler: Reconciler::new(),
            drag: DragReorderController::new(),
            scheduler: Scheduler::new(),
            gateway,
            host,
            clock,
            focus: None,
            press: None,
            load_source: loaded.source,
            options,
        };
        board.refresh(false);
        board.history.push(board.document.clone());
        let now = board.clock.now();
        board
            .scheduler
            .schedule_after(now, options.autosave_interval, BoardTask::Autosave);
        tracing::info!(
            target: "notepin.board",
            items = board.document.len(),
            history_depth = options.history.max_depth,
            "board opened"
        );
        board
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore<Document> {
        &self.history
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler<BoardTask> {
        &self.scheduler
    }

    #[must_use]
    pub fn gateway(&self) -> &PersistenceGateway<B> {
        &self.gateway
    }

    #[must_use]
    pub fn options(&self) -> &BoardOptions {
        &self.options
    }

    /// How the document was obtained when the board opened.
    #[must_use]
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    #[must_use]
    pub fn focus(&self) -> Option<FocusTarget> {
        self.focus
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Completed fraction, `0.0` when empty.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.document.progress()
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    fn refresh(&mut self, force_full_repack: bool) -> Reconciliation {
        self.reconciler.reconcile(
            &self.document.items,
            self.document.settings.font_size,
            force_full_repack,
            &mut self.host,
        )
    }

    /// Snapshot into history, then persist.
    fn record(&mut self) -> bool {
        self.history.push(self.document.clone());
        self.gateway.save(&self.document)
    }

    fn settle_drag(&mut self) {
        if let Some(active) = self.drag.active_id() {
            self.end_drag(active);
        }
    }

    fn restore(&mut self, snapshot: Document) {
        self.document = snapshot;
        self.ids.observe(&self.document);
        let pass = self.refresh(false);
        if self
            .focus
            .is_some_and(|target| self.document.position(target.id).is_none())
        {
            self.focus = None;
        }
        self.gateway.save(&self.document);
        tracing::debug!(
            target: "notepin.board",
            strategy = pass.strategy.as_str(),
            cursor = self.history.cursor().unwrap_or(0),
            "snapshot restored"
        );
    }

    // ------------------------------------------------------------------
    // Historically significant operations
    // ------------------------------------------------------------------

    /// Flip completion of `id`. Returns the new flag.
    pub fn toggle_completion(&mut self, id: ItemId) -> Option<bool> {
        self.settle_drag();
        let completed = self.document.toggle(id)?;
        self.refresh(false);
        self.record();
        tracing::debug!(target: "notepin.board", id = id.get(), completed, "item toggled");
        Some(completed)
    }

    /// Insert an empty item after `after` (or at the end) and focus it.
    /// Declines once item ids are exhausted.
    pub fn add_item(&mut self, after: Option<ItemId>) -> Option<ItemId> {
        self.add_item_with_text(after, "")
    }

    /// [`add_item`](Self::add_item) with initial text.
    pub fn add_item_with_text(&mut self, after: Option<ItemId>, text: &str) -> Option<ItemId> {
        self.settle_drag();
        let Some(id) = self.ids.allocate(&self.document) else {
            tracing::warn!(target: "notepin.board", "item ids exhausted; add declined");
            return None;
        };
        let index = self
            .document
            .insert_item(Item::new(id, now_stamp()).with_text(text), after);
        self.refresh(false);
        self.record();
        self.focus = Some(FocusTarget::new(id, Caret::Start));
        tracing::debug!(target: "notepin.board", id = id.get(), index, "item added");
        Some(id)
    }

    /// Remove `id`. Focus held by it moves to the previous item, else the
    /// first.
    pub fn delete_item(&mut self, id: ItemId) -> bool {
        self.settle_drag();
        let Some((index, _)) = self.document.remove(id) else {
            return false;
        };
        if self.focus.is_some_and(|target| target.id == id) {
            self.focus = focus::after_delete(&self.document.ids(), index);
        }
        self.refresh(false);
        self.record();
        tracing::debug!(target: "notepin.board", id = id.get(), index, "item deleted");
        true
    }

    /// Swap `id` with its neighbour. Declines at the edges.
    pub fn swap_items(&mut self, id: ItemId, direction: Direction) -> bool {
        self.settle_drag();
        if !self.document.swap(id, direction) {
            return false;
        }
        self.refresh(false);
        self.record();
        true
    }

    /// Remove every completed item. Returns the removed ids.
    pub fn clear_completed(&mut self) -> Vec<ItemId> {
        self.settle_drag();
        let removed = self.document.clear_completed();
        if removed.is_empty() {
            return removed;
        }
        if self
            .focus
            .is_some_and(|target| removed.contains(&target.id))
        {
            self.focus = self
                .document
                .items
                .first()
                .map(|item| FocusTarget::new(item.id, Caret::End));
        }
        self.refresh(false);
        self.record();
        tracing::debug!(target: "notepin.board", removed = removed.len(), "completed items cleared");
        removed
    }

    /// Apply a new font size to every row. Declines for zero or no change.
    pub fn change_font_size(&mut self, size: u32) -> bool {
        self.settle_drag();
        if size == 0 || size == self.document.settings.font_size {
            return false;
        }
        self.document.settings.font_size = size;
        self.refresh(false);
        self.record();
        true
    }

    /// Commit edited text for `id`.
    pub fn edit_text(&mut self, id: ItemId, text: &str) -> bool {
        self.settle_drag();
        if !self.document.set_text(id, text) {
            return false;
        }
        self.refresh(false);
        self.record();
        true
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.settle_drag();
        self.document.settings.mode = self.document.settings.mode.toggled();
        self.record();
        self.document.settings.mode
    }

    pub fn toggle_visibility_mode(&mut self) -> VisibilityMode {
        self.settle_drag();
        let settings = &mut self.document.settings;
        settings.visibility_mode = settings.visibility_mode.toggled();
        self.record();
        self.document.settings.visibility_mode
    }

    /// Explicit save: snapshot and persist.
    pub fn save_now(&mut self) -> bool {
        self.settle_drag();
        self.record()
    }

    // ------------------------------------------------------------------
    // History navigation and plain persistence
    // ------------------------------------------------------------------

    /// Restore the previous snapshot. Persists, never pushes.
    pub fn undo(&mut self) -> bool {
        self.settle_drag();
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Restore the next snapshot. Persists, never pushes.
    pub fn redo(&mut self) -> bool {
        self.settle_drag();
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Save without touching history.
    pub fn autosave(&mut self) -> bool {
        self.gateway.save(&self.document)
    }

    /// Record a new window placement. Persists, never pushes.
    pub fn set_window_geometry(&mut self, geometry: WindowGeometry) -> bool {
        if self.document.window == geometry {
            return false;
        }
        self.document.window = geometry;
        self.gateway.save(&self.document)
    }

    /// Final save; pending tasks are dropped.
    pub fn close(&mut self) -> bool {
        self.settle_drag();
        if let Some(press) = self.press.take() {
            self.scheduler.cancel(press.task);
        }
        self.scheduler.clear();
        let saved = self.gateway.save(&self.document);
        tracing::info!(target: "notepin.board", saved, "board closed");
        saved
    }

    // ------------------------------------------------------------------
    // Focus and keyboard
    // ------------------------------------------------------------------

    /// Focus `id`, caret at the end. Declines for unknown ids.
    pub fn set_focus(&mut self, id: ItemId) -> bool {
        if self.document.position(id).is_none() {
            return false;
        }
        self.focus = Some(FocusTarget::new(id, Caret::End));
        true
    }

    /// Move focus to the neighbour of `id`.
    pub fn focus_neighbor(&mut self, id: ItemId, direction: Direction) -> Option<FocusTarget> {
        let target = focus::neighbor(self.reconciler.order(), id, direction)?;
        self.focus = Some(target);
        Some(target)
    }

    /// Run a command against the focused item. Returns whether it applied.
    pub fn dispatch(&mut self, command: Command) -> bool {
        let focused = self.focus.map(|target| target.id);
        if command.needs_focus() && focused.is_none() {
            return false;
        }
        match (command, focused) {
            (Command::AddAfter, after) => self.add_item(after).is_some(),
            (Command::Undo, _) => self.undo(),
            (Command::Redo, _) => self.redo(),
            (Command::Save, _) => self.save_now(),
            (_, None) => false,
            (Command::ToggleCompletion, Some(id)) => self.toggle_completion(id).is_some(),
            (Command::DeleteItem, Some(id)) => self.delete_item(id),
            (Command::FocusPrevious, Some(id)) => self.focus_neighbor(id, Direction::Up).is_some(),
            (Command::FocusNext, Some(id)) => self.focus_neighbor(id, Direction::Down).is_some(),
            (Command::MoveUp, Some(id)) => self.swap_items(id, Direction::Up),
            (Command::MoveDown, Some(id)) => self.swap_items(id, Direction::Down),
        }
    }

    /// Resolve and dispatch a chord. Returns the command when the chord is
    /// bound, whether or not it applied; `None` leaves the key to the text
    /// widget.
    pub fn handle_key(&mut self, chord: KeyChord, edit: Option<&EditContext>) -> Option<Command> {
        let command = resolve(chord, edit)?;
        self.dispatch(command);
        Some(command)
    }

    // ------------------------------------------------------------------
    // Drag handles and drags
    // ------------------------------------------------------------------

    /// Pointer down on `id`'s handle: arm a drag after the long-press delay.
    pub fn press_handle(&mut self, id: ItemId) -> bool {
        self.settle_drag();
        if self.document.position(id).is_none() {
            return false;
        }
        if let Some(previous) = self.press.take() {
            self.scheduler.cancel(previous.task);
        }
        let now = self.clock.now();
        let task = self
            .scheduler
            .schedule_after(now, self.options.long_press, BoardTask::ArmDrag(id));
        self.press = Some(PendingPress { id, task });
        true
    }

    /// Pointer motion over the board. Ignored until a drag is armed.
    pub fn pointer_moved(&mut self, id: ItemId, pointer_y: i32) -> Option<usize> {
        self.update_drag(id, pointer_y)
    }

    /// Pointer up on `id`'s handle.
    pub fn release_handle(&mut self, id: ItemId) -> HandleRelease {
        if let Some(press) = self.press.filter(|press| press.id == id) {
            self.press = None;
            self.scheduler.cancel(press.task);
            return self
                .toggle_completion(id)
                .map_or(HandleRelease::Ignored, HandleRelease::Toggled);
        }
        match self.end_drag(id) {
            Some(outcome) => HandleRelease::Dropped(outcome),
            None => HandleRelease::Ignored,
        }
    }

    /// Start dragging `id`, settling any active drag first.
    pub fn begin_drag(&mut self, id: ItemId) -> bool {
        self.settle_drag();
        let started = self.drag.begin(id, &self.reconciler);
        if started {
            tracing::debug!(target: "notepin.board", id = id.get(), "drag started");
        }
        started
    }

    /// Track the pointer during a drag. View only; no history, no persist.
    pub fn update_drag(&mut self, id: ItemId, pointer_y: i32) -> Option<usize> {
        self.drag
            .update(id, pointer_y, &mut self.reconciler, &mut self.host)
    }

    /// Finish the active drag. Commits once when the order changed.
    pub fn end_drag(&mut self, id: ItemId) -> Option<DragOutcome> {
        let outcome = self.drag.end(id, &self.reconciler, &mut self.host)?;
        if outcome.order != self.document.ids() {
            self.document.reorder(&outcome.order);
            self.refresh(false);
            self.record();
            tracing::debug!(
                target: "notepin.board",
                id = outcome.id.get(),
                from = outcome.origin_index,
                to = outcome.final_index,
                "drag committed"
            );
        }
        Some(outcome)
    }

    // ------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------

    /// Run every task due now. Returns how many ran.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let due = self.scheduler.drain_due(now);
        let count = due.len();
        for task in due {
            match task {
                BoardTask::Autosave => {
                    self.autosave();
                    self.scheduler
                        .debounce(now, self.options.autosave_interval, BoardTask::Autosave);
                }
                BoardTask::ArmDrag(id) => {
                    if self.press.is_some_and(|press| press.id == id) {
                        self.press = None;
                        self.begin_drag(id);
                    }
                }
            }
        }
        count
    }
}
