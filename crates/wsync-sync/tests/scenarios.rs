//! End-to-end reconciliation scenarios against the in-memory repository

use pretty_assertions::assert_eq;
use std::sync::Arc;
use wsync_metadata::{
    FeatureFlagKey, FeatureFlagMap, FieldType, ObjectAttribute, ObjectMetadata, StandardId,
    WorkspaceId, WorkspaceSyncContext,
};
use wsync_standard::{
    standard_object_definitions, DynamicFieldDefinition, StandardObjectDefinition,
    StandardObjectFactory,
};
use wsync_sync::{
    compute_change_set, DataIntegrityError, InMemoryMetadataRepository, MetadataUpdater,
    ObjectFilter, MetadataRepository, SyncConfig, SyncError, WorkspaceSyncMetadataService,
    WriteOp,
};
use wsync_test_utils::{
    contact_definition, custom_field, custom_object, legacy_thing_definition, persisted,
    standard_object,
};

fn service(
    repo: &Arc<InMemoryMetadataRepository>,
    definitions: Vec<StandardObjectDefinition>,
) -> WorkspaceSyncMetadataService {
    WorkspaceSyncMetadataService::new(repo.clone()).with_definitions(definitions)
}

fn rendered(plan: &wsync_sync::MigrationPlan) -> Vec<String> {
    plan.iter().map(ToString::to_string).collect()
}

async fn sync(
    service: &WorkspaceSyncMetadataService,
    ws: WorkspaceId,
) -> Result<wsync_sync::SyncOutcome, SyncError> {
    service
        .synchronize(&WorkspaceSyncContext::new(ws), &FeatureFlagMap::new())
        .await
}

#[tokio::test]
async fn contact_is_created_then_left_alone() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    let service = service(&repo, vec![contact_definition()]);

    let first = sync(&service, ws).await.unwrap();
    assert_eq!(rendered(&first.plan), vec!["CREATE table contact (2 columns)"]);

    let stored = repo.objects(ws);
    assert_eq!(stored.len(), 1);
    let names: Vec<_> = stored[0].fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["name", "email"]);

    let second = sync(&service, ws).await.unwrap();
    assert!(second.plan.is_empty());
    assert!(second.summary.is_empty());
}

#[tokio::test]
async fn dropped_standard_object_is_deleted_after_its_fields() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    sync(&service(&repo, vec![contact_definition(), legacy_thing_definition()]), ws)
        .await
        .unwrap();

    let definitions = vec![contact_definition()];
    let context = WorkspaceSyncContext::new(ws);
    let persisted = repo
        .fetch_objects(ws, ObjectFilter::standard_fields())
        .await
        .unwrap();
    let canonical =
        StandardObjectFactory::create(&definitions, &context, &FeatureFlagMap::new()).unwrap();
    let storage = compute_change_set(&persisted, &canonical).unwrap();
    let (batch, _) = MetadataUpdater::prepare(&storage).unwrap();
    let kinds: Vec<_> = batch.iter().map(WriteOp::kind).collect();
    assert_eq!(kinds, vec!["delete_field", "delete_object"]);

    let outcome = sync(&service(&repo, definitions), ws).await.unwrap();
    assert_eq!(rendered(&outcome.plan), vec!["DELETE table legacyThing"]);
    let remaining: Vec<_> = repo
        .objects(ws)
        .into_iter()
        .map(|object| object.name_singular)
        .collect();
    assert_eq!(remaining, vec!["contact"]);
}

#[tokio::test]
async fn custom_field_on_standard_object_survives() {
    let ws = WorkspaceId::new();
    let seed = Arc::new(InMemoryMetadataRepository::new());
    sync(&service(&seed, vec![contact_definition()]), ws).await.unwrap();

    let mut snapshot = seed.snapshot();
    let contact = &mut snapshot.workspaces.get_mut(&ws).unwrap()[0];
    let mut tier = custom_field("loyaltyTier", "Loyalty Tier");
    tier.object_metadata_id = contact.id;
    contact.fields.push(tier.clone());
    let repo = Arc::new(InMemoryMetadataRepository::from_snapshot(snapshot));

    let outcome = sync(&service(&repo, vec![contact_definition()]), ws).await.unwrap();
    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.summary.fields_deleted, 0);
    assert!(repo.objects(ws)[0].fields.contains(&tier));

    // Even when custom fields are fetched, the comparator leaves them be.
    let persisted = repo.fetch_objects(ws, ObjectFilter::all()).await.unwrap();
    let canonical = StandardObjectFactory::create(
        &[contact_definition()],
        &WorkspaceSyncContext::new(ws),
        &FeatureFlagMap::new(),
    )
    .unwrap();
    let storage = compute_change_set(&persisted, &canonical).unwrap();
    assert_eq!(storage.fields_to_delete().len(), 0);
}

#[tokio::test]
async fn one_changed_attribute_yields_one_change() {
    let ws = WorkspaceId::new();
    let seed = Arc::new(InMemoryMetadataRepository::new());
    sync(&service(&seed, vec![contact_definition()]), ws).await.unwrap();

    let mut snapshot = seed.snapshot();
    snapshot.workspaces.get_mut(&ws).unwrap()[0].label_singular = "Kontakt".into();
    let repo = Arc::new(InMemoryMetadataRepository::from_snapshot(snapshot));

    let persisted = repo.objects(ws);
    let canonical = StandardObjectFactory::create(
        &[contact_definition()],
        &WorkspaceSyncContext::new(ws),
        &FeatureFlagMap::new(),
    )
    .unwrap();
    let storage = compute_change_set(&persisted, &canonical).unwrap();
    let patches: Vec<_> = storage.objects_to_update().collect();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].changed_attributes(), vec![ObjectAttribute::LabelSingular]);

    let outcome = sync(&service(&repo, vec![contact_definition()]), ws).await.unwrap();
    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.summary.objects_updated, 1);
    assert_eq!(repo.objects(ws)[0].label_singular, "Contact");
}

#[tokio::test]
async fn workspace_owned_attributes_are_not_reverted() {
    let ws = WorkspaceId::new();
    let seed = Arc::new(InMemoryMetadataRepository::new());
    sync(&service(&seed, vec![contact_definition()]), ws).await.unwrap();

    let mut snapshot = seed.snapshot();
    let contact = &mut snapshot.workspaces.get_mut(&ws).unwrap()[0];
    contact.icon = Some("IconHeart".into());
    contact.is_active = false;
    contact.fields[0].icon = Some("IconStar".into());
    let repo = Arc::new(InMemoryMetadataRepository::from_snapshot(snapshot));

    let outcome = sync(&service(&repo, vec![contact_definition()]), ws).await.unwrap();
    assert!(outcome.summary.is_empty());
    assert_eq!(repo.objects(ws)[0].icon.as_deref(), Some("IconHeart"));
}

#[tokio::test]
async fn failed_commit_writes_nothing_and_retry_succeeds() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    let service = service(&repo, vec![contact_definition(), legacy_thing_definition()]);

    repo.fail_next_commit();
    let error = sync(&service, ws).await.unwrap_err();
    assert!(matches!(error, SyncError::Persistence(_)));
    assert!(error.is_retryable());
    assert!(repo.objects(ws).is_empty());

    let retried = sync(&service, ws).await.unwrap();
    assert_eq!(retried.plan.len(), 2);
    assert_eq!(repo.objects(ws).len(), 2);
}

#[tokio::test]
async fn custom_object_claiming_standard_identity_is_rejected() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    repo.insert(
        ws,
        ObjectMetadata::new(ws, "contact", "contacts", "Contact", "Contacts")
            .custom()
            .with_standard_id(StandardId::for_object("contact")),
    );

    let error = sync(&service(&repo, vec![contact_definition()]), ws)
        .await
        .unwrap_err();
    assert!(matches!(error, SyncError::DataIntegrity(_)));
    assert!(!error.is_retryable());
    assert_eq!(repo.commit_count(), 0);
}

#[tokio::test]
async fn duplicate_persisted_identity_is_rejected() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    repo.insert(ws, standard_object(ws, "contact", &[("name", FieldType::Text)]));
    repo.insert(ws, standard_object(ws, "contact", &[("name", FieldType::Text)]));

    let error = sync(&service(&repo, vec![contact_definition()]), ws)
        .await
        .unwrap_err();
    assert!(matches!(error, SyncError::DataIntegrity(_)));
}

#[tokio::test]
async fn custom_object_shadowing_a_join_column_is_rejected() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    repo.insert(ws, custom_object(ws, "personId", "Person Id"));

    let error = sync(&service(&repo, standard_object_definitions()), ws)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        SyncError::DataIntegrity(DataIntegrityError::DynamicFieldCollision { ref field, .. })
            if field == "personId"
    ));
    assert_eq!(repo.commit_count(), 0);
    assert_eq!(repo.objects(ws).len(), 1);
}

#[tokio::test]
async fn custom_objects_are_never_deleted() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    let pet = repo.insert(ws, custom_object(ws, "pet", "Pet"));

    let outcome = sync(&service(&repo, Vec::new()), ws).await.unwrap();
    assert!(outcome.plan.is_empty());
    assert_eq!(repo.objects(ws), vec![pet]);
}

#[tokio::test]
async fn dynamic_fields_follow_custom_objects() {
    let ws = WorkspaceId::new();
    let favorite = StandardObjectDefinition::new("favorite", "favorites", "Favorite", "Favorites")
        .per_custom_object(DynamicFieldDefinition::new("custom").with_join_column());
    let seed = Arc::new(InMemoryMetadataRepository::new());
    let pet = seed.insert(ws, custom_object(ws, "pet", "Pet"));

    sync(&service(&seed, vec![favorite.clone()]), ws).await.unwrap();
    let stored = seed
        .objects(ws)
        .into_iter()
        .find(|object| object.name_singular == "favorite")
        .unwrap();
    let names: Vec<_> = stored.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["pet", "petId"]);

    // Stable across runs while the custom object exists.
    assert!(sync(&service(&seed, vec![favorite.clone()]), ws)
        .await
        .unwrap()
        .summary
        .is_empty());

    // Removing the custom object retires its dynamic fields.
    let mut snapshot = seed.snapshot();
    snapshot
        .workspaces
        .get_mut(&ws)
        .unwrap()
        .retain(|object| object.id != pet.id);
    let repo = Arc::new(InMemoryMetadataRepository::from_snapshot(snapshot));
    let outcome = service(&repo, vec![favorite])
        .with_config(SyncConfig::new().with_field_migrations(true))
        .synchronize(&WorkspaceSyncContext::new(ws), &FeatureFlagMap::new())
        .await
        .unwrap();
    assert_eq!(outcome.summary.fields_deleted, 2);
    assert_eq!(rendered(&outcome.plan), vec!["DELETE column favorite.petId"]);
    assert!(repo.objects(ws)[0].fields.is_empty());
}

#[tokio::test]
async fn builtin_catalog_converges_with_every_flag() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    repo.insert(ws, custom_object(ws, "pet", "Pet"));
    let flags: FeatureFlagMap = [
        (FeatureFlagKey::IsBlocklistEnabled, true),
        (FeatureFlagKey::IsCalendarEnabled, true),
        (FeatureFlagKey::IsMessagingEnabled, true),
    ]
    .into_iter()
    .collect();
    let service = WorkspaceSyncMetadataService::new(repo.clone());
    let context = WorkspaceSyncContext::new(ws);

    let first = service.synchronize(&context, &flags).await.unwrap();
    assert_eq!(first.plan.len(), standard_object_definitions().len());

    let second = service.synchronize(&context, &flags).await.unwrap();
    assert!(second.plan.is_empty());
    assert!(second.summary.is_empty());

    // Turning a flag off retires the gated object and the relation to it.
    let narrowed = flags.with(FeatureFlagKey::IsCalendarEnabled, false);
    let third = service.synchronize(&context, &narrowed).await.unwrap();
    assert_eq!(rendered(&third.plan), vec!["DELETE table calendarEvent"]);
    assert_eq!(third.summary.fields_deleted, 2);
}

#[tokio::test]
async fn persisted_fixture_is_matched_by_identity() {
    let ws = WorkspaceId::new();
    let repo = Arc::new(InMemoryMetadataRepository::new());
    let mut renamed = persisted(standard_object(
        ws,
        "contact",
        &[("name", FieldType::Text), ("email", FieldType::Email)],
    ));
    renamed.name_singular = "person".into();
    renamed.target_table_name = "contact".into();
    repo.insert(ws, renamed);

    let outcome = sync(&service(&repo, vec![contact_definition()]), ws).await.unwrap();
    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.summary.objects_created, 0);
    assert_eq!(repo.objects(ws)[0].name_singular, "contact");
}
