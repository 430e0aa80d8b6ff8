//! Session actor: the single writer for one canvas.
//!
//! DESIGN
//! ======
//! One tokio task owns the [`EngineCore`]. Everything that mutates the
//! document or the view arrives as a [`Command`] on a bounded channel and is
//! applied in arrival order, so there are no locks around canvas state.
//! Readers subscribe to a `watch` channel of [`SessionSnapshot`]s; a snapshot
//! shares the document `Arc`, so publishing never copies emoji.
//!
//! Remote backgrounds are fetched on spawned tasks and decoded on the
//! blocking pool. The decoded result comes back on a separate completion
//! channel and the staleness check plus state update run inside one
//! synchronous handler on the owner task. In-flight fetches are never
//! cancelled; their results are discarded if the background moved on.
//!
//! The command loop ends when every [`SessionHandle`] is dropped.

use std::sync::Arc;

use canvas::background::{FetchOutcome, FetchRequest, FetchStatus, ImageDecoder};
use canvas::camera::{Camera, DocPoint, Point, Size};
use canvas::doc::{Background, DocError, Document, EmojiId};
use canvas::engine::{Action, EngineCore};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::drop::{DropIntent, DropItem, resolve};
use crate::fetch::ByteFetcher;

/// Errors returned to [`SessionHandle`] callers.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    /// The session task has stopped.
    #[error("session closed")]
    Closed,

    #[error(transparent)]
    Doc(#[from] DocError),
}

/// Intents accepted by the session task.
#[derive(Debug)]
pub enum Command {
    /// Resolve a drop at a screen point.
    Drop { items: Vec<DropItem>, at: Point },
    SetBackground(Background),
    AddEmoji { text: String, at: DocPoint, size: i32, reply: oneshot::Sender<Result<EmojiId, DocError>> },
    MoveEmoji { id: EmojiId, dx: i32, dy: i32 },
    ScaleEmoji { id: EmojiId, factor: f64 },
    PanChanged(Point),
    PanEnded(Point),
    ZoomChanged(f64),
    ZoomEnded(f64),
    CancelGesture,
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    ZoomToFit,
    SetViewport(Size),
    /// Reply with the current snapshot version once every earlier command
    /// has been applied.
    Sync(oneshot::Sender<u64>),
}

/// Read-only view of a session, published after every state change.
#[derive(Debug, Clone)]
pub struct SessionSnapshot<I> {
    /// Increments on every publish.
    pub version: u64,
    pub document: Arc<Document>,
    pub status: FetchStatus,
    /// Resolved background image, if any.
    pub image: Option<I>,
    /// Natural size of `image`.
    pub image_size: Option<Size>,
    pub camera: Camera,
    pub viewport: Size,
    /// Fetch results dropped because the background had changed meanwhile.
    pub discarded_fetches: u64,
}

impl<I> SessionSnapshot<I> {
    fn initial(viewport: Size) -> Self {
        Self {
            version: 0,
            document: Arc::new(Document::new()),
            status: FetchStatus::Idle,
            image: None,
            image_size: None,
            camera: Camera::default(),
            viewport,
            discarded_fetches: 0,
        }
    }

    /// Renderers hide emoji and show progress while this is true.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.status == FetchStatus::Fetching
    }
}

/// Cloneable sender side of a session.
#[derive(Debug)]
pub struct SessionHandle<I> {
    id: Uuid,
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot<I>>,
}

impl<I> Clone for SessionHandle<I> {
    fn clone(&self) -> Self {
        Self { id: self.id, commands: self.commands.clone(), snapshots: self.snapshots.clone() }
    }
}

impl<I: Clone> SessionHandle<I> {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a command, waiting for queue space.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<I> {
        self.snapshots.borrow().clone()
    }

    /// A receiver that wakes on every publish.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot<I>> {
        self.snapshots.clone()
    }

    /// Wait until all previously sent commands have been applied and return
    /// the snapshot at that point.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn sync(&self) -> Result<SessionSnapshot<I>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Sync(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)?;
        Ok(self.snapshot())
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Doc`] if `text` is not a single glyph.
    pub async fn add_emoji(&self, text: &str, at: DocPoint, size: i32) -> Result<EmojiId, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AddEmoji { text: text.to_owned(), at, size, reply })
            .await?;
        let added = rx.await.map_err(|_| SessionError::Closed)?;
        Ok(added?)
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn drop_items(&self, items: Vec<DropItem>, at: Point) -> Result<(), SessionError> {
        self.send(Command::Drop { items, at }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn set_background(&self, background: Background) -> Result<(), SessionError> {
        self.send(Command::SetBackground(background)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn move_emoji(&self, id: EmojiId, dx: i32, dy: i32) -> Result<(), SessionError> {
        self.send(Command::MoveEmoji { id, dx, dy }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn scale_emoji(&self, id: EmojiId, factor: f64) -> Result<(), SessionError> {
        self.send(Command::ScaleEmoji { id, factor }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn zoom_to_fit(&self) -> Result<(), SessionError> {
        self.send(Command::ZoomToFit).await
    }
}

struct FetchCompletion<I> {
    request: FetchRequest,
    image: Option<I>,
}

struct Session<D: ImageDecoder> {
    id: Uuid,
    core: EngineCore<D>,
    fetcher: Arc<dyn ByteFetcher>,
    completions: mpsc::Sender<FetchCompletion<D::Image>>,
    snapshots: watch::Sender<SessionSnapshot<D::Image>>,
    version: u64,
    discarded_fetches: u64,
}

/// Spawn a session task. Returns its handle and the task's join handle.
#[must_use]
pub fn spawn_session<D>(
    config: &SessionConfig,
    decoder: D,
    fetcher: Arc<dyn ByteFetcher>,
) -> (SessionHandle<D::Image>, JoinHandle<()>)
where
    D: ImageDecoder + Clone + Send + Sync + 'static,
    D::Image: Send + Sync + 'static,
{
    let id = Uuid::new_v4();
    let (command_tx, command_rx) = mpsc::channel(config.command_queue_capacity);
    let (completion_tx, completion_rx) = mpsc::channel(config.command_queue_capacity);
    let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::initial(config.viewport));

    let session = Session {
        id,
        core: EngineCore::new(decoder, config.viewport),
        fetcher,
        completions: completion_tx,
        snapshots: snapshot_tx,
        version: 0,
        discarded_fetches: 0,
    };

    info!(
        session_id = %id,
        queue_capacity = config.command_queue_capacity,
        viewport_width = config.viewport.width,
        viewport_height = config.viewport.height,
        "session started"
    );
    let task = tokio::spawn(session.run(command_rx, completion_rx));

    (SessionHandle { id, commands: command_tx, snapshots: snapshot_rx }, task)
}

impl<D> Session<D>
where
    D: ImageDecoder + Clone + Send + Sync + 'static,
    D::Image: Send + Sync + 'static,
{
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::Receiver<FetchCompletion<D::Image>>,
    ) {
        loop {
            tokio::select! {
                maybe_command = commands.recv() => {
                    let Some(command) = maybe_command else { break };
                    if self.handle_command(command) {
                        self.publish();
                    }
                }
                Some(done) = completions.recv() => {
                    if self.handle_completion(done) {
                        self.publish();
                    }
                }
            }
        }
        info!(session_id = %self.id, "session stopped");
    }

    /// Apply one command. Returns true if observable state changed.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Drop { items, at } => self.apply_drop(&items, at),
            Command::SetBackground(background) => self.apply_background(background),
            Command::AddEmoji { text, at, size, reply } => {
                let result = self.core.add_emoji(&text, at, size);
                let changed = self.log_added(&text, &result);
                if reply.send(result).is_err() {
                    debug!(session_id = %self.id, "add_emoji caller went away");
                }
                changed
            }
            Command::MoveEmoji { id, dx, dy } => {
                let moved = self.core.move_emoji(id, dx, dy);
                if !moved {
                    debug!(session_id = %self.id, emoji_id = id, "move of unknown emoji ignored");
                }
                moved
            }
            Command::ScaleEmoji { id, factor } => match self.core.scale_emoji(id, factor) {
                Ok(scaled) => scaled,
                Err(e) => {
                    warn!(session_id = %self.id, emoji_id = id, error = %e, "scale rejected");
                    false
                }
            },
            Command::PanChanged(t) => self.core.pan_changed(t),
            Command::PanEnded(t) => self.core.pan_ended(t),
            Command::ZoomChanged(scale) => self.core.zoom_changed(scale),
            Command::ZoomEnded(scale) => self.core.zoom_ended(scale),
            Command::CancelGesture => self.core.cancel_gesture(),
            Command::PointerDown(p) => {
                self.core.on_pointer_down(p);
                false
            }
            Command::PointerMove(p) => {
                let actions = self.core.on_pointer_move(p);
                self.dispatch(actions)
            }
            Command::PointerUp(p) => {
                let actions = self.core.on_pointer_up(p);
                self.dispatch(actions)
            }
            Command::ZoomToFit => {
                let actions = self.core.zoom_to_fit();
                self.dispatch(actions)
            }
            Command::SetViewport(size) => self.core.set_viewport(size),
            Command::Sync(reply) => {
                if reply.send(self.version).is_err() {
                    debug!(session_id = %self.id, "sync caller went away");
                }
                false
            }
        }
    }

    fn apply_drop(&mut self, items: &[DropItem], at: Point) -> bool {
        match resolve(items) {
            Some(DropIntent::SetBackground(background)) => self.apply_background(background),
            Some(DropIntent::AddEmoji(glyph)) => {
                let result = self.core.drop_emoji(&glyph, at);
                self.log_added(&glyph, &result)
            }
            None => {
                debug!(session_id = %self.id, items = items.len(), "drop had nothing usable");
                false
            }
        }
    }

    fn apply_background(&mut self, background: Background) -> bool {
        let actions = self.core.set_background(background);
        if actions.is_empty() {
            debug!(session_id = %self.id, "background unchanged");
            return false;
        }
        info!(session_id = %self.id, background = ?self.core.document().background(), "background set");
        self.dispatch(actions)
    }

    fn log_added(&self, text: &str, result: &Result<EmojiId, DocError>) -> bool {
        match result {
            Ok(id) => {
                debug!(session_id = %self.id, emoji_id = id, text, "emoji added");
                true
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "emoji rejected");
                false
            }
        }
    }

    /// Run engine actions. Returns true if any asked for a re-render.
    fn dispatch(&mut self, actions: Vec<Action>) -> bool {
        let mut render = false;
        for action in actions {
            match action {
                Action::FetchBackground(request) => self.spawn_fetch(request),
                Action::RenderNeeded => render = true,
            }
        }
        render
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        let session_id = self.id;
        let fetcher = Arc::clone(&self.fetcher);
        let decoder = self.core.decoder().clone();
        let completions = self.completions.clone();
        debug!(%session_id, url = %request.url, "background fetch started");

        tokio::spawn(async move {
            let image = match fetcher.fetch(&request.url).await {
                Ok(bytes) => decode_off_thread(decoder, bytes).await,
                Err(e) => {
                    warn!(%session_id, url = %request.url, error = %e, "background fetch failed");
                    None
                }
            };
            if completions
                .send(FetchCompletion { request, image })
                .await
                .is_err()
            {
                debug!(%session_id, "session closed before fetch completed");
            }
        });
    }

    fn handle_completion(&mut self, done: FetchCompletion<D::Image>) -> bool {
        let resolved = done.image.is_some();
        match self.core.complete_fetch(&done.request, done.image) {
            FetchOutcome::Applied => {
                if resolved {
                    info!(session_id = %self.id, url = %done.request.url, "background resolved");
                } else {
                    warn!(session_id = %self.id, url = %done.request.url, "background unavailable");
                }
                true
            }
            FetchOutcome::Stale => {
                debug!(session_id = %self.id, url = %done.request.url, "stale background fetch discarded");
                self.discarded_fetches += 1;
                true
            }
        }
    }

    fn publish(&mut self) {
        self.version += 1;
        self.snapshots.send_replace(SessionSnapshot {
            version: self.version,
            document: self.core.snapshot(),
            status: self.core.fetch_status(),
            image: self.core.background_image().cloned(),
            image_size: self.core.background_image_size(),
            camera: self.core.camera(),
            viewport: self.core.viewport(),
            discarded_fetches: self.discarded_fetches,
        });
    }
}

async fn decode_off_thread<D>(decoder: D, bytes: Vec<u8>) -> Option<D::Image>
where
    D: ImageDecoder + Send + 'static,
    D::Image: Send + 'static,
{
    let len = bytes.len();
    match tokio::task::spawn_blocking(move || decoder.decode(&bytes)).await {
        Ok(Some(image)) => Some(image),
        Ok(None) => {
            warn!(len, "fetched background is not a decodable image");
            None
        }
        Err(e) => {
            warn!(error = %e, "background decode task failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
