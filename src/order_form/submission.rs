use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use super::controller::OrderFormController;
use crate::api::OrderApi;
use crate::cache::{CollectionKey, QueryCache};
use crate::domain::Order;
use crate::error::{ApiError, FieldErrors};
use crate::notify::Notifier;

pub const ORDER_CREATED: &str = "Order created successfully!";
pub const ORDER_FAILED: &str = "Failed to create order";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Order validation error: {0}")]
    Validation(FieldErrors),
    #[error("Order submission failed: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Order),
    /// Created after the form was closed; the new form state was left alone.
    Superseded(Order),
    /// Another submission from this form session is still in flight.
    AlreadyPending,
}

/// Releases a session's pending claim however the submission ends.
///
/// A claim taken by a later session is left in place.
struct PendingGuard<'a> {
    pending: &'a Mutex<Option<u64>>,
    session: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.pending.lock();
        if *pending == Some(self.session) {
            *pending = None;
        }
    }
}

/// Sends an order form's draft to the order API, at most one request per
/// form session at a time.
pub struct OrderSubmitter {
    form: Arc<Mutex<OrderFormController>>,
    api: Arc<dyn OrderApi>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    /// Session of the submission in flight, if any.
    pending: Mutex<Option<u64>>,
}

impl std::fmt::Debug for OrderSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSubmitter")
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl OrderSubmitter {
    pub fn new(
        form: OrderFormController,
        api: Arc<dyn OrderApi>,
        cache: QueryCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            form: Arc::new(Mutex::new(form)),
            api,
            cache,
            notifier,
            pending: Mutex::new(None),
        }
    }

    /// Shared handle to the form state.
    pub fn form(&self) -> Arc<Mutex<OrderFormController>> {
        Arc::clone(&self.form)
    }

    /// Runs `f` against the form under its lock.
    pub fn with_form<R>(&self, f: impl FnOnce(&mut OrderFormController) -> R) -> R {
        f(&mut self.form.lock())
    }

    /// Whether the current form session has a submission in flight.
    pub fn is_pending(&self) -> bool {
        let session = self.form.lock().session();
        *self.pending.lock() == Some(session)
    }

    /// Closes the form. A response still in flight will not touch the new
    /// state, and the reopened form may submit right away.
    pub fn close(&self) {
        self.form.lock().close();
    }

    /// Validates the draft and, if it passes, creates the order.
    ///
    /// # Outcomes
    /// - `Created`: the form is reset and the `orders` collection invalidated
    /// - `Superseded`: same, except the form had been closed and is left as is
    /// - `AlreadyPending`: nothing was sent
    ///
    /// # Errors
    /// `Validation` leaves the errors on the form fields and sends nothing.
    /// `Api` notifies the failure and sets the form's root error; the draft is kept.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
        let (session, _guard, request) = {
            let mut form = self.form.lock();
            let session = form.session();
            {
                let mut pending = self.pending.lock();
                if *pending == Some(session) {
                    debug!(session, "Submission already in flight");
                    return Ok(SubmitOutcome::AlreadyPending);
                }
                *pending = Some(session);
            }
            let guard = PendingGuard { pending: &self.pending, session };
            let request = form.prepare_submission().map_err(SubmitError::Validation)?;
            (session, guard, request)
        };

        debug!(order_type = %request.order_type(), service_id = %request.service_id, "Sending request");
        match self.api.create_order(&request).await {
            Ok(order) => {
                info!(order_id = %order.id, provider_order_id = %order.provider_order_id, "Order created");
                self.cache.invalidate(CollectionKey::Orders).await;
                self.notifier.success(ORDER_CREATED);

                let mut form = self.form.lock();
                if form.session() == session {
                    form.reset();
                    Ok(SubmitOutcome::Created(order))
                } else {
                    debug!("Form closed while submitting, leaving it untouched");
                    Ok(SubmitOutcome::Superseded(order))
                }
            }
            Err(e) => {
                error!(error = %e, "Order creation failed");
                self.notifier.error(e.server_message().unwrap_or(ORDER_FAILED));

                let mut form = self.form.lock();
                if form.session() == session {
                    form.set_root_error(ORDER_FAILED);
                }
                Err(SubmitError::Api(e))
            }
        }
    }
}
