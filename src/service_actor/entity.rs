use crate::actor_framework::Entity;
use crate::domain::Service;
use super::dtos::ServiceRecord;

impl Entity for Service {
    type Id = String;
    type CreatePayload = ServiceRecord;
    type Patch = (); // Services are replaced, not edited
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &String { &self.id }

    /// Creates a new Service from a validated creation payload.
    ///
    /// # Errors
    /// Returns the validation summary if the payload breaks catalog rules.
    fn from_create(id: String, record: ServiceRecord) -> Result<Self, String> {
        record.spec.validate().map_err(|e| e.to_string())?;
        let spec = record.spec;
        Ok(Self {
            id,
            name: spec.name.trim().to_string(),
            rate: spec.rate,
            min: spec.min,
            max: spec.max,
            is_free: spec.is_free,
            dripfeed: spec.dripfeed,
            refill: spec.refill,
            cancel: spec.cancel,
            category: record.category,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
