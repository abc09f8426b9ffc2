use std::collections::HashMap;
use std::hash::Hash;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any panel record must implement to be managed by a ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and Payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> { Ok(()) }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

/// Failures surfaced by a [`ResourceClient`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Rejected(String),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    }
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    // Insertion order, so listings are stable across calls
    order: Vec<T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    pub async fn run(mut self) {
        debug!(entity = std::any::type_name::<T>(), "Resource actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let id = (self.next_id_fn)();
                    match T::from_create(id.clone(), payload) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create() {
                                let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            self.order.push(id.clone());
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => { let _ = respond_to.send(Err(FrameworkError::Rejected(e))); }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let items = self
                        .order
                        .iter()
                        .filter_map(|id| self.store.get(id).cloned())
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    if let Some(item) = self.store.get_mut(&id) {
                        if let Err(e) = item.on_update(patch) {
                            let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                            continue;
                        }
                        let _ = respond_to.send(Ok(item.clone()));
                    } else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete() {
                            let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                            continue;
                        }
                        self.store.remove(&id);
                        self.order.retain(|existing| existing != &id);
                        let _ = respond_to.send(Ok(()));
                    } else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item.handle_action(action).map_err(FrameworkError::Rejected);
                        if let Err(e) = &result {
                            warn!(id = %id, error = %e, "Action rejected");
                        }
                        let _ = respond_to.send(result);
                    } else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
            }
        }
        debug!(entity = std::any::type_name::<T>(), "Resource actor stopped");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Derive would require `T: Clone` on the id/payload types as well.
impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(build(respond_to))
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}
