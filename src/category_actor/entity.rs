use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{validated_category_name, Category, CategoryCreate, CategoryPatch};

impl Entity for Category {
    type Id = String;
    type CreatePayload = CategoryCreate;
    type Patch = CategoryPatch;
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &String { &self.id }

    fn from_create(id: String, params: CategoryCreate) -> Result<Self, String> {
        let name = validated_category_name(&params.name).map_err(|e| e.message)?;
        let now = Utc::now();
        Ok(Self { id, name, created_at: Some(now), updated_at: Some(now) })
    }

    /// Renames the category.
    fn on_update(&mut self, patch: CategoryPatch) -> Result<(), String> {
        self.name = validated_category_name(&patch.name).map_err(|e| e.message)?;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
