//! The custom-fields CRUD controller.
//!
//! Maps admin actions onto store operations: list the field definitions
//! grouped by subtype, create a field of a dynamically selected subtype,
//! update and delete definitions, and manage the options of list fields.
//! Every action requires an administrator and reports its outcome through
//! the request's flash storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use worktrack_core::error::ValidationError;
use worktrack_core::logging::action_span;

use crate::auth::{require_admin, CurrentUser};
use crate::hooks::{CustomFieldHook, HookRegistry};
use crate::license::EnterpriseGate;
use crate::messages::Flash;
use crate::model::{CustomField, WorkPackageType};
use crate::options::reconcile_options;
use crate::params::CustomFieldParams;
use crate::redirect::{
    back_url_or_default, custom_fields_path, custom_fields_tab_path, edit_custom_field_path,
};
use crate::registry::CustomFieldType;
use crate::store::CustomFieldStore;

/// The per-request context an action executes in.
#[derive(Debug)]
pub struct RequestContext {
    /// The user the request executes as.
    pub user: CurrentUser,
    /// One-time messages collected during the action.
    pub flash: Flash,
    /// The page the user came from, if the client supplied one.
    pub back_url: Option<String>,
}

impl RequestContext {
    /// Creates a context for the given user.
    pub fn new(user: CurrentUser) -> Self {
        Self {
            user,
            flash: Flash::new(),
            back_url: None,
        }
    }

    /// Sets the back-url the client supplied.
    #[must_use]
    pub fn with_back_url(mut self, url: impl Into<String>) -> Self {
        self.back_url = Some(url.into());
        self
    }
}

/// One row of the listing: a field with its eagerly resolved work-package
/// types (empty for non-work-package fields).
#[derive(Debug, Clone, Serialize)]
pub struct CustomFieldRow {
    /// The field definition.
    pub field: CustomField,
    /// The work-package types the field is enabled on.
    pub work_package_types: Vec<WorkPackageType>,
}

/// The data behind the listing page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexView {
    /// Field rows grouped by subtype tag. Empty groups are omitted.
    pub custom_fields_by_type: BTreeMap<String, Vec<CustomFieldRow>>,
    /// The currently selected tab.
    pub tab: String,
}

/// The data behind the creation and edit forms.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    /// The field being created or edited; on a failed write this is the
    /// rejected in-memory record.
    pub custom_field: CustomField,
    /// Validation errors to display; empty on a fresh render.
    pub errors: ValidationError,
}

impl FormView {
    fn fresh(custom_field: CustomField) -> Self {
        Self {
            custom_field,
            errors: ValidationError::default(),
        }
    }

    fn with_errors(custom_field: CustomField, errors: ValidationError) -> Self {
        Self {
            custom_field,
            errors,
        }
    }
}

/// What an action tells the framework to do next.
#[derive(Debug)]
pub enum ControllerResponse {
    /// Render the listing.
    Index(IndexView),
    /// Render the creation form.
    NewForm(FormView),
    /// Render the edit form.
    EditForm(FormView),
    /// Redirect to the given in-application path.
    Redirect(String),
    /// The addressed record does not exist.
    NotFound,
    /// The user is not an administrator.
    Forbidden,
}

/// The administrative CRUD controller for custom fields.
pub struct CustomFieldsController {
    store: Arc<dyn CustomFieldStore>,
    gate: Arc<dyn EnterpriseGate>,
    hooks: Arc<HookRegistry>,
}

impl CustomFieldsController {
    /// Creates a controller over the given store, entitlement gate, and
    /// hook registry.
    pub fn new(
        store: Arc<dyn CustomFieldStore>,
        gate: Arc<dyn EnterpriseGate>,
        hooks: Arc<HookRegistry>,
    ) -> Self {
        Self { store, gate, hooks }
    }

    /// Lists all custom fields grouped by subtype.
    ///
    /// Work-package fields have their enabled work-package types resolved in
    /// a single store call instead of one per row. `tab` defaults to the
    /// work-package tab.
    pub async fn index(&self, ctx: &mut RequestContext, tab: Option<&str>) -> ControllerResponse {
        let span = action_span("custom_fields", "index");
        let _guard = span.enter();
        if require_admin(&ctx.user).is_err() {
            return ControllerResponse::Forbidden;
        }

        let fields = self.store.all_fields().await;

        // One fetch for every work-package type referenced by any field.
        let wp_type_ids: Vec<u64> = {
            let mut ids: Vec<u64> = fields
                .iter()
                .filter(|f| f.field_type == CustomFieldType::WorkPackage)
                .flat_map(|f| f.work_package_type_ids.iter().copied())
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let wp_types: BTreeMap<u64, WorkPackageType> = self
            .store
            .work_package_types(&wp_type_ids)
            .await
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut custom_fields_by_type: BTreeMap<String, Vec<CustomFieldRow>> = BTreeMap::new();
        for field in fields {
            let work_package_types = if field.field_type == CustomFieldType::WorkPackage {
                field
                    .work_package_type_ids
                    .iter()
                    .filter_map(|id| wp_types.get(id))
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            };
            custom_fields_by_type
                .entry(field.field_type.tag().to_string())
                .or_default()
                .push(CustomFieldRow {
                    field,
                    work_package_types,
                });
        }

        ControllerResponse::Index(IndexView {
            custom_fields_by_type,
            tab: tab
                .unwrap_or(CustomFieldType::WorkPackage.tag())
                .to_string(),
        })
    }

    /// Renders the creation form for a subtype, or redirects to the listing
    /// when the requested tag does not resolve.
    pub async fn new_form(&self, ctx: &mut RequestContext, type_tag: &str) -> ControllerResponse {
        let span = action_span("custom_fields", "new");
        let _guard = span.enter();
        if require_admin(&ctx.user).is_err() {
            return ControllerResponse::Forbidden;
        }

        match Self::careful_new(type_tag) {
            Some(field) => ControllerResponse::NewForm(FormView::fresh(field)),
            None => ControllerResponse::Redirect(custom_fields_path()),
        }
    }

    /// Creates a custom field of the requested subtype.
    pub async fn create(
        &self,
        ctx: &mut RequestContext,
        type_tag: &str,
        params: CustomFieldParams,
    ) -> ControllerResponse {
        let span = action_span("custom_fields", "create");
        let _guard = span.enter();
        if require_admin(&ctx.user).is_err() {
            return ControllerResponse::Forbidden;
        }

        let Some(mut field) = Self::careful_new(type_tag) else {
            return ControllerResponse::Redirect(custom_fields_path());
        };

        let params = params.filtered(self.gate.as_ref());
        params.apply_to(&mut field);
        // On a brand-new record the reconciler only builds in memory.
        if let Err(err) = reconcile_options(&mut field, &params.custom_options, self.store.as_ref()).await
        {
            tracing::error!(error = %err, "failed to attach custom options");
            return ControllerResponse::NewForm(FormView::with_errors(
                field,
                ValidationError::new(err.to_string(), "invalid"),
            ));
        }

        match self.store.save_field(&mut field).await {
            Ok(()) => {
                ctx.flash.notice("Successful creation.");
                self.hooks.call(CustomFieldHook::Created, &field);
                tracing::info!(id = field.id, name = %field.name, "custom field created");
                ControllerResponse::Redirect(custom_fields_tab_path(field.field_type.tag()))
            }
            Err(errors) => ControllerResponse::NewForm(FormView::with_errors(field, errors)),
        }
    }

    /// Renders the edit form for an existing field.
    pub async fn edit(&self, ctx: &mut RequestContext, id: u64) -> ControllerResponse {
        let span = action_span("custom_fields", "edit");
        let _guard = span.enter();
        if require_admin(&ctx.user).is_err() {
            return ControllerResponse::Forbidden;
        }

        match self.store.find_field(id).await {
            Some(field) => ControllerResponse::EditForm(FormView::fresh(field)),
            None => ControllerResponse::NotFound,
        }
    }

    /// Updates an existing field and reconciles its submitted options.
    pub async fn update(
        &self,
        ctx: &mut RequestContext,
        id: u64,
        params: CustomFieldParams,
    ) -> ControllerResponse {
        let span = action_span("custom_fields", "update");
        let _guard = span.enter();
        if require_admin(&ctx.user).is_err() {
            return ControllerResponse::Forbidden;
        }

        let Some(mut field) = self.store.find_field(id).await else {
            return ControllerResponse::NotFound;
        };

        let params = params.filtered(self.gate.as_ref());
        params.apply_to(&mut field);

        // Options are only reconciled once the attributes themselves hold.
        if let Err(errors) = field.validate() {
            return ControllerResponse::EditForm(FormView::with_errors(field, errors));
        }
        if let Err(err) = reconcile_options(&mut field, &params.custom_options, self.store.as_ref()).await
        {
            tracing::error!(id, error = %err, "failed to reconcile custom options");
            return ControllerResponse::EditForm(FormView::with_errors(
                field,
                ValidationError::new(err.to_string(), "invalid"),
            ));
        }

        match self.store.save_field(&mut field).await {
            Ok(()) => {
                ctx.flash.notice("Successful update.");
                self.hooks.call(CustomFieldHook::Updated, &field);
                tracing::info!(id = field.id, "custom field updated");
                ControllerResponse::Redirect(back_url_or_default(
                    ctx.back_url.as_deref(),
                    &edit_custom_field_path(field.id),
                ))
            }
            Err(errors) => ControllerResponse::EditForm(FormView::with_errors(field, errors)),
        }
    }

    /// Deletes a field, tolerating referential-integrity failures.
    pub async fn destroy(&self, ctx: &mut RequestContext, id: u64) -> ControllerResponse {
        let span = action_span("custom_fields", "destroy");
        let _guard = span.enter();
        if require_admin(&ctx.user).is_err() {
            return ControllerResponse::Forbidden;
        }

        let Some(field) = self.store.find_field(id).await else {
            return ControllerResponse::NotFound;
        };

        if let Err(err) = self.store.destroy_field(id).await {
            tracing::warn!(id, error = %err, "custom field could not be deleted");
            ctx.flash.error("Unable to delete custom field.");
        }

        ControllerResponse::Redirect(custom_fields_tab_path(field.field_type.tag()))
    }

    /// Deletes a single option of a list field together with every custom
    /// value recorded for it.
    ///
    /// The option is looked up by exact id only; whether it belongs to the
    /// addressed field is not checked.
    pub async fn delete_option(
        &self,
        ctx: &mut RequestContext,
        id: u64,
        option_id: u64,
    ) -> ControllerResponse {
        let span = action_span("custom_fields", "delete_option");
        let _guard = span.enter();
        if require_admin(&ctx.user).is_err() {
            return ControllerResponse::Forbidden;
        }

        let Some(field) = self.store.find_field(id).await else {
            return ControllerResponse::NotFound;
        };

        match self.store.find_option(option_id).await {
            Some(option) => {
                let num_deleted = self
                    .store
                    .delete_custom_values(option.custom_field_id, &option.id.to_string())
                    .await;
                match self.store.destroy_option(option.id).await {
                    Ok(()) => {
                        tracing::info!(
                            option_id = option.id,
                            num_deleted,
                            "custom option deleted"
                        );
                        ctx.flash.notice(format!(
                            "Option '{}' and {num_deleted} occurrence(s) of it were deleted.",
                            option.value
                        ));
                    }
                    Err(err) => {
                        tracing::error!(option_id = option.id, error = %err, "option deletion failed");
                        ctx.flash.error("Unable to delete custom option.");
                    }
                }
            }
            None => {
                ctx.flash.error("Option could not be found.");
            }
        }

        ControllerResponse::Redirect(edit_custom_field_path(field.id))
    }

    /// Constructs an unsaved field of the requested subtype, or `None` when
    /// the tag does not resolve to a registered subtype.
    fn careful_new(type_tag: &str) -> Option<CustomField> {
        match CustomFieldType::from_tag(type_tag) {
            Some(field_type) => Some(CustomField::new(field_type)),
            None => {
                tracing::error!(tag = type_tag, "cannot resolve custom field type");
                None
            }
        }
    }
}
