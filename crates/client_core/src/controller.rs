//! Item-list controller: user actions to store calls followed by a full reload.

use std::{collections::HashMap, sync::Arc};

use shared::domain::RecordId;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    error::FlowError,
    flow::{EditForm, FlowState},
    kind::{ListRecord, RecordKind},
    render::{render_items, render_load_failure, Fragment, RenderOptions, ViewState},
    store::RemoteStore,
};

/// The document the controller renders into.
pub trait DocumentView<K: RecordKind>: Send + Sync {
    /// Replaces the whole item container.
    fn replace_items(&self, fragment: &Fragment);
    fn reset_add_form(&self);
    fn show_edit_surface(&self, form: &EditForm<K::Changes>);
    fn hide_edit_surface(&self);
}

/// Blocking notifications and confirmations.
pub trait UserPrompts: Send + Sync {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// Collaborators built once at startup and handed to the controller.
pub struct ControllerContext<K: RecordKind> {
    pub store: Arc<dyn RemoteStore<K>>,
    pub view: Arc<dyn DocumentView<K>>,
    pub prompts: Arc<dyn UserPrompts>,
    pub render: RenderOptions,
}

impl<K: RecordKind> Clone for ControllerContext<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            view: self.view.clone(),
            prompts: self.prompts.clone(),
            render: self.render,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    CloseTrigger,
    /// Anywhere outside the edit surface's bounds.
    Outside,
    Inside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The store call failed and the user was alerted.
    Failed,
    /// The user declined a confirmation; nothing was sent.
    Declined,
    /// The action does not apply in the current flow state.
    Ignored,
}

/// Edit flow in one slot; each pending delete walks its own flow keyed by record id.
pub struct ItemListController<K: RecordKind> {
    ctx: ControllerContext<K>,
    state: Mutex<FlowState<K::Changes>>,
    deletes: Mutex<HashMap<RecordId, FlowState<K::Changes>>>,
}

impl<K: RecordKind> ItemListController<K> {
    pub fn new(ctx: ControllerContext<K>) -> Self {
        Self {
            ctx,
            state: Mutex::new(FlowState::Idle),
            deletes: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &ControllerContext<K> {
        &self.ctx
    }

    /// State of the edit flow.
    pub async fn state(&self) -> FlowState<K::Changes> {
        self.state.lock().await.clone()
    }

    pub async fn delete_state(&self, id: &RecordId) -> FlowState<K::Changes> {
        self.deletes
            .lock()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    async fn transition<E>(&self, event: E) -> Result<FlowState<K::Changes>, FlowError>
    where
        E: FnOnce(&FlowState<K::Changes>) -> Result<FlowState<K::Changes>, FlowError>,
    {
        let mut state = self.state.lock().await;
        let next = event(&*state)?;
        debug!(
            kind = K::DESCRIPTOR.name,
            from = state.name(),
            to = next.name(),
            "flow transition"
        );
        *state = next.clone();
        Ok(next)
    }

    async fn delete_transition<E>(&self, id: &RecordId, event: E) -> Result<(), FlowError>
    where
        E: FnOnce(&FlowState<K::Changes>) -> Result<FlowState<K::Changes>, FlowError>,
    {
        let mut deletes = self.deletes.lock().await;
        let current = deletes.get(id).cloned().unwrap_or_default();
        let next = event(&current)?;
        debug!(
            kind = K::DESCRIPTOR.name,
            id = %id,
            from = current.name(),
            to = next.name(),
            "delete transition"
        );
        if next.is_idle() {
            deletes.remove(id);
        } else {
            deletes.insert(id.clone(), next);
        }
        Ok(())
    }

    fn ignored(&self, err: FlowError) -> ActionOutcome {
        warn!(kind = K::DESCRIPTOR.name, error = %err, "ignoring action");
        ActionOutcome::Ignored
    }

    /// Fetches the full list and replaces the view with it. On failure the view shows the
    /// load-failure placeholder instead of the previous list.
    pub async fn reload(&self) -> ViewState {
        let fragment = match self.ctx.store.list_all().await {
            Ok(records) => render_items(&K::DESCRIPTOR, &records, &self.ctx.render),
            Err(err) => {
                error!(kind = K::DESCRIPTOR.name, error = %err, "failed to load list");
                render_load_failure(&K::DESCRIPTOR)
            }
        };
        self.ctx.view.replace_items(&fragment);
        fragment.state()
    }

    /// Add-form submission. Not gated by the edit flow, and repeated submissions each
    /// dispatch their own create call.
    pub async fn submit_add(&self, draft: K::Draft) -> ActionOutcome {
        match self.ctx.store.create(&draft).await {
            Ok(()) => {
                info!(kind = K::DESCRIPTOR.name, "record created");
                self.ctx.view.reset_add_form();
                self.reload().await;
                ActionOutcome::Completed
            }
            Err(err) => {
                error!(kind = K::DESCRIPTOR.name, error = %err, "failed to create record");
                self.ctx.prompts.alert(K::DESCRIPTOR.locale.create_failed);
                ActionOutcome::Failed
            }
        }
    }

    pub async fn open_edit(&self, id: RecordId) -> ActionOutcome {
        if let Err(err) = self.transition(|s| s.begin_edit(id.clone())).await {
            return self.ignored(err);
        }

        match self.ctx.store.get_one(&id).await {
            Ok(record) => {
                let form = EditForm {
                    id: record.id().clone(),
                    fields: K::edit_fields(&record),
                };
                if let Err(err) = self.transition(|s| s.edit_loaded(form.clone())).await {
                    error!(
                        kind = K::DESCRIPTOR.name,
                        id = %id,
                        error = %err,
                        "loaded record cannot fill the edit form"
                    );
                    return self.abandon_edit_load().await;
                }
                self.ctx.view.show_edit_surface(&form);
                ActionOutcome::Completed
            }
            Err(err) => {
                error!(
                    kind = K::DESCRIPTOR.name,
                    id = %id,
                    not_found = err.is_not_found(),
                    error = %err,
                    "failed to load record for editing"
                );
                self.abandon_edit_load().await
            }
        }
    }

    async fn abandon_edit_load(&self) -> ActionOutcome {
        if let Err(err) = self.transition(|s| s.edit_load_failed()).await {
            return self.ignored(err);
        }
        self.ctx.prompts.alert(K::DESCRIPTOR.locale.fetch_failed);
        ActionOutcome::Failed
    }

    /// Submits the open edit form. The target id comes from the form populated by
    /// [`Self::open_edit`].
    pub async fn submit_edit(&self, fields: K::Changes) -> ActionOutcome {
        let form = match self.transition(|s| s.submit_edit(fields)).await {
            Ok(FlowState::Submitting(form)) => form,
            Ok(_) => return ActionOutcome::Ignored,
            Err(err) => return self.ignored(err),
        };

        match self.ctx.store.update(&form.id, &form.fields).await {
            Ok(()) => {
                info!(kind = K::DESCRIPTOR.name, id = %form.id, "record updated");
                if let Err(err) = self.transition(|s| s.submit_succeeded()).await {
                    return self.ignored(err);
                }
                self.ctx.view.hide_edit_surface();
                self.reload().await;
                ActionOutcome::Completed
            }
            Err(err) => {
                error!(
                    kind = K::DESCRIPTOR.name,
                    id = %form.id,
                    error = %err,
                    "failed to update record"
                );
                if let Err(err) = self.transition(|s| s.submit_failed()).await {
                    return self.ignored(err);
                }
                self.ctx.prompts.alert(K::DESCRIPTOR.locale.update_failed);
                ActionOutcome::Failed
            }
        }
    }

    /// Hides the edit surface without submitting.
    pub async fn close_edit(&self) -> ActionOutcome {
        match self.transition(|s| s.close_edit()).await {
            Ok(_) => {
                self.ctx.view.hide_edit_surface();
                ActionOutcome::Completed
            }
            Err(err) => {
                debug!(kind = K::DESCRIPTOR.name, error = %err, "nothing to close");
                ActionOutcome::Ignored
            }
        }
    }

    pub async fn handle_click(&self, target: ClickTarget) -> ActionOutcome {
        match target {
            ClickTarget::CloseTrigger | ClickTarget::Outside => self.close_edit().await,
            ClickTarget::Inside => ActionOutcome::Ignored,
        }
    }

    /// Asks for confirmation, then deletes. Declining issues no request. Runs beside the edit
    /// flow and beside deletes of other records; a second delete of the same record while
    /// the first is pending is ignored.
    pub async fn request_delete(&self, id: RecordId) -> ActionOutcome {
        if let Err(err) = self
            .delete_transition(&id, |s| s.request_delete(id.clone()))
            .await
        {
            return self.ignored(err);
        }

        if !self.ctx.prompts.confirm(K::DESCRIPTOR.locale.confirm_delete) {
            info!(kind = K::DESCRIPTOR.name, id = %id, "delete declined");
            if let Err(err) = self.delete_transition(&id, |s| s.delete_declined()).await {
                return self.ignored(err);
            }
            return ActionOutcome::Declined;
        }

        if let Err(err) = self.delete_transition(&id, |s| s.delete_confirmed()).await {
            return self.ignored(err);
        }
        let result = self.ctx.store.delete_one(&id).await;
        if let Err(err) = self.delete_transition(&id, |s| s.delete_finished()).await {
            return self.ignored(err);
        }

        match result {
            Ok(()) => {
                info!(kind = K::DESCRIPTOR.name, id = %id, "record deleted");
                self.reload().await;
                ActionOutcome::Completed
            }
            Err(err) => {
                error!(
                    kind = K::DESCRIPTOR.name,
                    id = %id,
                    error = %err,
                    "failed to delete record"
                );
                self.ctx.prompts.alert(K::DESCRIPTOR.locale.delete_failed);
                ActionOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
