//! Integration tests for the custom-fields controller: creation with the
//! subtype registry guard, listing, updates with the enterprise gate,
//! deletion, and option reconciliation and deletion.

use std::sync::Arc;

use worktrack_admin::auth::CurrentUser;
use worktrack_admin::controller::{
    ControllerResponse, CustomFieldsController, RequestContext,
};
use worktrack_admin::hooks::{CustomFieldHook, HookRegistry};
use worktrack_admin::license::{EnterpriseFeature, StaticGate};
use worktrack_admin::model::{CustomField, CustomValue, FieldFormat};
use worktrack_admin::params::{CustomFieldParams, SubmittedOption};
use worktrack_admin::registry::CustomFieldType;
use worktrack_admin::store::{CustomFieldStore, InMemoryStore};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    store: InMemoryStore,
    controller: CustomFieldsController,
    hooks: Arc<HookRegistry>,
}

fn harness_with_gate(gate: StaticGate) -> Harness {
    let store = InMemoryStore::new();
    let hooks = Arc::new(HookRegistry::new());
    let controller = CustomFieldsController::new(
        Arc::new(store.clone()),
        Arc::new(gate),
        Arc::clone(&hooks),
    );
    Harness {
        store,
        controller,
        hooks,
    }
}

fn harness() -> Harness {
    harness_with_gate(StaticGate::none())
}

fn admin_ctx() -> RequestContext {
    RequestContext::new(CurrentUser::admin("root"))
}

fn list_params(name: &str, options: Vec<SubmittedOption>) -> CustomFieldParams {
    CustomFieldParams {
        name: Some(name.to_string()),
        field_format: Some(FieldFormat::List),
        custom_options: options,
        ..CustomFieldParams::default()
    }
}

async fn seed_color_field(store: &InMemoryStore) -> CustomField {
    let mut field = CustomField::new(CustomFieldType::WorkPackage)
        .name("Color")
        .format(FieldFormat::List)
        .with_option("Green", false)
        .with_option("Blue", false);
    store.save_field(&mut field).await.unwrap();
    field
}

fn redirect_target(response: &ControllerResponse) -> &str {
    match response {
        ControllerResponse::Redirect(path) => path,
        other => panic!("expected Redirect, got {other:?}"),
    }
}

// ═════════════════════════════════════════════════════════════════════
// Creation through the subtype registry
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_with_every_registered_subtype() {
    let h = harness();
    for subtype in CustomFieldType::ALL {
        let mut ctx = admin_ctx();
        let params = CustomFieldParams {
            name: Some(format!("Field for {}", subtype.tag())),
            ..CustomFieldParams::default()
        };
        let response = h.controller.create(&mut ctx, subtype.tag(), params).await;
        assert_eq!(
            redirect_target(&response),
            &format!("/admin/custom_fields?tab={}", subtype.tag())
        );
        assert_eq!(ctx.flash.peek()[0].text, "Successful creation.");
    }
    assert_eq!(h.store.field_count(), CustomFieldType::ALL.len());
}

#[tokio::test]
async fn test_create_with_unresolvable_type_is_a_noop() {
    let h = harness();
    for tag in ["WorkPackage", "EvilCustomField", "", "Project "] {
        let mut ctx = admin_ctx();
        let params = CustomFieldParams {
            name: Some("Anything".to_string()),
            ..CustomFieldParams::default()
        };
        let response = h.controller.create(&mut ctx, tag, params).await;
        assert_eq!(redirect_target(&response), "/admin/custom_fields");
        assert!(ctx.flash.is_empty());
    }
    assert_eq!(h.store.field_count(), 0);
}

#[tokio::test]
async fn test_create_fires_created_hook_once() {
    let h = harness();
    let fired = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    h.hooks.connect(
        CustomFieldHook::Created,
        "test",
        Arc::new(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }),
    );

    let mut ctx = admin_ctx();
    let params = CustomFieldParams {
        name: Some("Budget".to_string()),
        ..CustomFieldParams::default()
    };
    h.controller
        .create(&mut ctx, "ProjectCustomField", params)
        .await;
    assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_create_invalid_field_rerenders_with_errors() {
    let h = harness();
    let mut ctx = admin_ctx();
    // List field without options fails model validation.
    let response = h
        .controller
        .create(&mut ctx, "ProjectCustomField", list_params("Stage", vec![]))
        .await;
    match response {
        ControllerResponse::NewForm(view) => {
            assert!(!view.errors.on("custom_options").is_empty());
            assert_eq!(view.custom_field.name, "Stage");
        }
        other => panic!("expected NewForm, got {other:?}"),
    }
    assert_eq!(h.store.field_count(), 0);
    assert!(ctx.flash.is_empty());
}

#[tokio::test]
async fn test_create_list_field_with_options() {
    let h = harness();
    let mut ctx = admin_ctx();
    let params = list_params(
        "Severity",
        vec![
            SubmittedOption::new("Low"),
            SubmittedOption::new("High").default_flag("1"),
        ],
    );
    h.controller
        .create(&mut ctx, "WorkPackageCustomField", params)
        .await;

    let field = h.store.find_field(1).await.unwrap();
    assert_eq!(field.custom_options.len(), 2);
    assert_eq!(field.custom_options[0].position, 1);
    assert_eq!(field.custom_options[1].position, 2);
    assert!(field.custom_options[1].default_value);
}

// ═════════════════════════════════════════════════════════════════════
// Listing
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_index_groups_by_subtype_and_resolves_types() {
    let h = harness();
    let task = h.store.insert_work_package_type("Task");
    let bug = h.store.insert_work_package_type("Bug");

    let mut wp_field = CustomField::new(CustomFieldType::WorkPackage)
        .name("Severity")
        .format(FieldFormat::List)
        .with_option("Low", false);
    wp_field.work_package_type_ids = vec![task.id, bug.id];
    h.store.save_field(&mut wp_field).await.unwrap();

    let mut project_field = CustomField::new(CustomFieldType::Project).name("Budget");
    h.store.save_field(&mut project_field).await.unwrap();

    let mut ctx = admin_ctx();
    match h.controller.index(&mut ctx, Some("ProjectCustomField")).await {
        ControllerResponse::Index(view) => {
            assert_eq!(view.tab, "ProjectCustomField");
            assert_eq!(view.custom_fields_by_type.len(), 2);

            let wp_rows = &view.custom_fields_by_type["WorkPackageCustomField"];
            assert_eq!(wp_rows[0].work_package_types.len(), 2);
            assert_eq!(wp_rows[0].work_package_types[0].name, "Task");

            let project_rows = &view.custom_fields_by_type["ProjectCustomField"];
            assert!(project_rows[0].work_package_types.is_empty());
        }
        other => panic!("expected Index, got {other:?}"),
    }
}

// ═════════════════════════════════════════════════════════════════════
// Update and the enterprise gate
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_redirects_to_edit_page_by_default() {
    let h = harness();
    let field = seed_color_field(&h.store).await;

    let mut ctx = admin_ctx();
    let params = CustomFieldParams {
        name: Some("Colour".to_string()),
        ..CustomFieldParams::default()
    };
    let response = h.controller.update(&mut ctx, field.id, params).await;
    assert_eq!(
        redirect_target(&response),
        &format!("/admin/custom_fields/{}/edit", field.id)
    );
    assert_eq!(h.store.find_field(field.id).await.unwrap().name, "Colour");
    assert_eq!(ctx.flash.peek()[0].text, "Successful update.");
}

#[tokio::test]
async fn test_update_honors_safe_back_url() {
    let h = harness();
    let field = seed_color_field(&h.store).await;

    let mut ctx = admin_ctx().with_back_url("/admin/custom_fields?tab=WorkPackageCustomField");
    let response = h
        .controller
        .update(&mut ctx, field.id, CustomFieldParams::default())
        .await;
    assert_eq!(
        redirect_target(&response),
        "/admin/custom_fields?tab=WorkPackageCustomField"
    );

    let mut ctx = admin_ctx().with_back_url("https://evil.example/");
    let response = h
        .controller
        .update(&mut ctx, field.id, CustomFieldParams::default())
        .await;
    assert_eq!(
        redirect_target(&response),
        &format!("/admin/custom_fields/{}/edit", field.id)
    );
}

#[tokio::test]
async fn test_update_strips_multi_value_without_entitlement() {
    let h = harness();
    let field = seed_color_field(&h.store).await;

    let mut ctx = admin_ctx();
    let params = CustomFieldParams {
        multi_value: Some(true),
        ..CustomFieldParams::default()
    };
    h.controller.update(&mut ctx, field.id, params).await;
    assert!(!h.store.find_field(field.id).await.unwrap().multi_value);
}

#[tokio::test]
async fn test_update_applies_multi_value_with_entitlement() {
    let h = harness_with_gate(StaticGate::allowing([
        EnterpriseFeature::MultiselectCustomFields,
    ]));
    let field = seed_color_field(&h.store).await;

    let mut ctx = admin_ctx();
    let params = CustomFieldParams {
        multi_value: Some(true),
        ..CustomFieldParams::default()
    };
    h.controller.update(&mut ctx, field.id, params).await;
    assert!(h.store.find_field(field.id).await.unwrap().multi_value);
}

#[tokio::test]
async fn test_update_fires_updated_hook_once() {
    let h = harness();
    let field = seed_color_field(&h.store).await;
    let fired = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    h.hooks.connect(
        CustomFieldHook::Updated,
        "test",
        Arc::new(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }),
    );

    let mut ctx = admin_ctx();
    let params = CustomFieldParams {
        name: Some("Colour".to_string()),
        ..CustomFieldParams::default()
    };
    h.controller.update(&mut ctx, field.id, params).await;
    assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), 1);

    // A rejected update does not fire.
    let mut ctx = admin_ctx();
    let params = CustomFieldParams {
        name: Some(String::new()),
        ..CustomFieldParams::default()
    };
    h.controller.update(&mut ctx, field.id, params).await;
    assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_update_invalid_rerenders_edit_form() {
    let h = harness();
    let field = seed_color_field(&h.store).await;

    let mut ctx = admin_ctx();
    let params = CustomFieldParams {
        name: Some(String::new()),
        ..CustomFieldParams::default()
    };
    let response = h.controller.update(&mut ctx, field.id, params).await;
    match response {
        ControllerResponse::EditForm(view) => {
            assert!(!view.errors.on("name").is_empty());
        }
        other => panic!("expected EditForm, got {other:?}"),
    }
    // The stored record is untouched.
    assert_eq!(h.store.find_field(field.id).await.unwrap().name, "Color");
}

#[tokio::test]
async fn test_update_missing_field_is_not_found() {
    let h = harness();
    let mut ctx = admin_ctx();
    assert!(matches!(
        h.controller
            .update(&mut ctx, 42, CustomFieldParams::default())
            .await,
        ControllerResponse::NotFound
    ));
}

// ═════════════════════════════════════════════════════════════════════
// Option reconciliation through update
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_reassigns_positions_in_submission_order() {
    let h = harness();
    let field = seed_color_field(&h.store).await;

    // Reverse the order and append a new option.
    let mut ctx = admin_ctx();
    let params = list_params(
        "Color",
        vec![
            SubmittedOption::existing(2, "Blue"),
            SubmittedOption::existing(1, "Green"),
            SubmittedOption::new("Red"),
        ],
    );
    h.controller.update(&mut ctx, field.id, params).await;

    let stored = h.store.find_field(field.id).await.unwrap();
    let positions: Vec<(u64, u32)> = stored
        .custom_options
        .iter()
        .map(|o| (o.id, o.position))
        .collect();
    assert_eq!(positions, vec![(1, 2), (2, 1), (3, 3)]);
}

#[tokio::test]
async fn test_update_mixed_new_and_existing_options() {
    // Submitting {"": Red} and {"5": Blue, default} where option 5 exists at
    // position 3 yields a new "Red" at position 1 and option 5 renamed to
    // "Blue", default, at position 2.
    let h = harness();
    let mut field = CustomField::new(CustomFieldType::WorkPackage)
        .name("Color")
        .format(FieldFormat::List)
        .with_option("One", false)
        .with_option("Two", false)
        .with_option("Three", false)
        .with_option("Four", false)
        .with_option("Cyan", false);
    field.custom_options[4].position = 3;
    h.store.save_field(&mut field).await.unwrap();
    assert_eq!(field.custom_options[4].id, 5);

    let mut ctx = admin_ctx();
    let params = list_params(
        "Color",
        vec![
            SubmittedOption::new("Red"),
            SubmittedOption::existing(5, "Blue").default_flag("1"),
        ],
    );
    h.controller.update(&mut ctx, field.id, params).await;

    let stored = h.store.find_field(field.id).await.unwrap();
    let red = stored
        .custom_options
        .iter()
        .find(|o| o.value == "Red")
        .unwrap();
    assert_eq!(red.position, 1);
    assert!(!red.default_value);

    let blue = stored.custom_options.iter().find(|o| o.id == 5).unwrap();
    assert_eq!(blue.value, "Blue");
    assert!(blue.default_value);
    assert_eq!(blue.position, 2);
}

// ═════════════════════════════════════════════════════════════════════
// Deletion
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_destroy_removes_unreferenced_field() {
    let h = harness();
    let field = seed_color_field(&h.store).await;

    let mut ctx = admin_ctx();
    let response = h.controller.destroy(&mut ctx, field.id).await;
    assert_eq!(
        redirect_target(&response),
        "/admin/custom_fields?tab=WorkPackageCustomField"
    );
    assert!(ctx.flash.is_empty());
    assert!(h.store.find_field(field.id).await.is_none());
}

#[tokio::test]
async fn test_destroy_referenced_field_surfaces_error() {
    let h = harness();
    let field = seed_color_field(&h.store).await;
    h.store
        .create_custom_value(CustomValue::new(field.id, 1, "1"))
        .await;

    let mut ctx = admin_ctx();
    let response = h.controller.destroy(&mut ctx, field.id).await;
    assert_eq!(
        redirect_target(&response),
        "/admin/custom_fields?tab=WorkPackageCustomField"
    );
    assert_eq!(ctx.flash.peek()[0].text, "Unable to delete custom field.");
    assert!(h.store.find_field(field.id).await.is_some());
}

// ═════════════════════════════════════════════════════════════════════
// Option deletion
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_delete_option_removes_option_and_values() {
    let h = harness();
    let field = seed_color_field(&h.store).await;
    let option_id = field.custom_options[0].id;

    // Three work packages recorded the option, one recorded another.
    for customized in 1..=3 {
        h.store
            .create_custom_value(CustomValue::new(
                field.id,
                customized,
                option_id.to_string(),
            ))
            .await;
    }
    h.store
        .create_custom_value(CustomValue::new(field.id, 4, "999"))
        .await;

    let mut ctx = admin_ctx();
    let response = h.controller.delete_option(&mut ctx, field.id, option_id).await;
    assert_eq!(
        redirect_target(&response),
        &format!("/admin/custom_fields/{}/edit", field.id)
    );
    assert!(ctx.flash.peek()[0].text.contains("'Green'"));
    assert!(ctx.flash.peek()[0].text.contains('3'));

    assert!(h.store.find_option(option_id).await.is_none());
    assert_eq!(h.store.custom_value_count(), 1);
}

#[tokio::test]
async fn test_delete_missing_option_surfaces_error() {
    let h = harness();
    let field = seed_color_field(&h.store).await;

    let mut ctx = admin_ctx();
    let response = h.controller.delete_option(&mut ctx, field.id, 999).await;
    assert_eq!(
        redirect_target(&response),
        &format!("/admin/custom_fields/{}/edit", field.id)
    );
    assert_eq!(ctx.flash.peek()[0].text, "Option could not be found.");
    assert_eq!(
        h.store.find_field(field.id).await.unwrap().custom_options.len(),
        2
    );
}

#[tokio::test]
async fn test_delete_option_of_another_field_still_works() {
    // Only an exact id lookup is performed; the option need not belong to
    // the field addressed in the URL.
    let h = harness();
    let field = seed_color_field(&h.store).await;
    let mut other = CustomField::new(CustomFieldType::Project)
        .name("Stage")
        .format(FieldFormat::List)
        .with_option("Alpha", false);
    h.store.save_field(&mut other).await.unwrap();
    let foreign_option = other.custom_options[0].id;

    let mut ctx = admin_ctx();
    let response = h
        .controller
        .delete_option(&mut ctx, field.id, foreign_option)
        .await;
    // Redirects to the addressed field's edit page regardless.
    assert_eq!(
        redirect_target(&response),
        &format!("/admin/custom_fields/{}/edit", field.id)
    );
    assert!(h.store.find_option(foreign_option).await.is_none());
}
