// Copyright 2023 Remi Bernotavicius

//! Create, read, update and delete for any [`Document`].

use super::models::{Document, DocumentId, DocumentRow, NewDocument};
use super::schema::documents;
use super::Connection;
use crate::merge::{self, Patch};
use crate::model::entity::Entity as _;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::OptionalExtension as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use uuid::Uuid;

fn decode<D: Document>(row: DocumentRow) -> Result<D> {
    Ok(serde_json::from_str(&row.body)?)
}

pub fn find<D: Document>(conn: &mut Connection, id: Uuid) -> Result<Option<D>> {
    documents::table
        .select(DocumentRow::as_select())
        .filter(documents::collection.eq(D::COLLECTION))
        .filter(documents::id.eq(DocumentId::from(id)))
        .get_result(conn)
        .optional()?
        .map(decode)
        .transpose()
}

/// Like [`find`] but a missing document is an error.
pub fn get<D: Document>(conn: &mut Connection, id: Uuid) -> Result<D> {
    find(conn, id)?.ok_or(Error::NotFound {
        collection: D::COLLECTION,
        id,
    })
}

/// Every document of type `D` hanging off `entity_id`, in insertion order.
pub fn find_by_entity<D: Document>(conn: &mut Connection, entity_id: Uuid) -> Result<Vec<D>> {
    documents::table
        .select(DocumentRow::as_select())
        .filter(documents::collection.eq(D::COLLECTION))
        .filter(documents::entity_id.eq(entity_id.to_string()))
        .order_by(documents::seq)
        .load(conn)?
        .into_iter()
        .map(decode)
        .collect()
}

pub fn list<D: Document>(conn: &mut Connection) -> Result<Vec<D>> {
    documents::table
        .select(DocumentRow::as_select())
        .filter(documents::collection.eq(D::COLLECTION))
        .order_by(documents::seq)
        .load(conn)?
        .into_iter()
        .map(decode)
        .collect()
}

/// Stores a new document owned by `user_id`. A nil id is replaced by a fresh
/// one. Returns the id the document was stored under.
pub fn insert<D: Document>(
    conn: &mut Connection,
    document: &mut D,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Uuid> {
    if document.id().is_nil() {
        document.set_id(Uuid::new_v4());
    }
    document.set_user_id(user_id);
    document.stamp_insert(now);

    let body = serde_json::to_string(document)?;
    diesel::insert_into(documents::table)
        .values(NewDocument::new(document, &body))
        .execute(conn)?;
    log::debug!(
        "inserted {} {} for {} at {}",
        D::COLLECTION,
        document.id(),
        document.user_id(),
        document.date_insert()
    );
    Ok(document.id())
}

/// Writes `document` as-is, replacing any stored version. A replaced document
/// keeps its place in insertion order.
pub fn save<D: Document>(conn: &mut Connection, document: &D) -> Result<()> {
    let body = serde_json::to_string(document)?;
    let updated = diesel::update(
        documents::table
            .filter(documents::collection.eq(D::COLLECTION))
            .filter(documents::id.eq(DocumentId::from(document.id()))),
    )
    .set((
        documents::entity_id.eq(document.parent_id().map(|id| id.to_string())),
        documents::body.eq(&body),
    ))
    .execute(conn)?;

    if updated == 0 {
        diesel::insert_into(documents::table)
            .values(NewDocument::new(document, &body))
            .execute(conn)?;
    }
    log::debug!("saved {} {}", D::COLLECTION, document.id());
    Ok(())
}

/// Loads the document, applies `patches` in order and stores the result.
pub fn update<P>(
    conn: &mut Connection,
    id: Uuid,
    patches: &[P],
    now: DateTime<Utc>,
) -> Result<P::Target>
where
    P: Patch,
    P::Target: Document,
{
    let mut document = get::<P::Target>(conn, id)?;
    merge::apply(&mut document, patches);
    document.touch(now);
    save(conn, &document)?;
    log::debug!(
        "patched {} {id} at {}",
        <P::Target as Document>::COLLECTION,
        document.date_update()
    );
    Ok(document)
}

/// Returns whether there was anything to delete.
pub fn delete<D: Document>(conn: &mut Connection, id: Uuid) -> Result<bool> {
    let deleted = diesel::delete(
        documents::table
            .filter(documents::collection.eq(D::COLLECTION))
            .filter(documents::id.eq(DocumentId::from(id))),
    )
    .execute(conn)?;
    log::debug!("deleted {deleted} from {} {id}", D::COLLECTION);
    Ok(deleted > 0)
}

#[cfg(test)]
fn test_connection() -> Connection {
    super::establish_connection(":memory:").unwrap()
}

#[test]
fn insert_and_find() {
    use crate::model::entity::Recipe;
    use chrono::TimeZone as _;

    let mut conn = test_connection();
    let user = Uuid::from_u128(9);
    let now = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();

    let mut recipe = Recipe {
        name: "Stew".into(),
        ..Default::default()
    };
    let id = insert(&mut conn, &mut recipe, user, now).unwrap();
    assert!(!id.is_nil());
    assert_eq!(recipe.id, id);
    assert_eq!(recipe.user_id, user);
    assert_eq!(recipe.date_insert, now);
    assert_eq!(recipe.date_update, now);

    assert_eq!(find::<Recipe>(&mut conn, id).unwrap(), Some(recipe.clone()));
    assert_eq!(get::<Recipe>(&mut conn, id).unwrap(), recipe);
    assert_eq!(list::<Recipe>(&mut conn).unwrap(), vec![recipe]);

    let missing = Uuid::from_u128(1);
    assert_eq!(find::<Recipe>(&mut conn, missing).unwrap(), None);
    assert!(matches!(
        get::<Recipe>(&mut conn, missing),
        Err(Error::NotFound { id, .. }) if id == missing
    ));
}

#[test]
fn collections_are_separate() {
    use crate::model::entity::{Category, Recipe};

    let mut conn = test_connection();
    let mut recipe = Recipe::default();
    let id = insert(&mut conn, &mut recipe, Uuid::from_u128(9), Utc::now()).unwrap();

    assert_eq!(find::<Category>(&mut conn, id).unwrap(), None);
    assert!(!delete::<Category>(&mut conn, id).unwrap());
    assert!(delete::<Recipe>(&mut conn, id).unwrap());
    assert_eq!(find::<Recipe>(&mut conn, id).unwrap(), None);
}

#[test]
fn children_in_insertion_order() {
    use crate::model::entity::AltName;

    let mut conn = test_connection();
    let owner = Uuid::from_u128(1);
    let mut inserted = vec![];
    for name in ["c", "a", "b"] {
        let mut alt_name = AltName {
            entity_id: owner,
            name: name.into(),
            ..Default::default()
        };
        insert(&mut conn, &mut alt_name, Uuid::from_u128(9), Utc::now()).unwrap();
        inserted.push(alt_name);
    }
    let mut other = AltName {
        entity_id: Uuid::from_u128(2),
        ..Default::default()
    };
    insert(&mut conn, &mut other, Uuid::from_u128(9), Utc::now()).unwrap();

    assert_eq!(find_by_entity::<AltName>(&mut conn, owner).unwrap(), inserted);

    // re-saving keeps the position
    inserted[0].name = "z".into();
    save(&mut conn, &inserted[0]).unwrap();
    assert_eq!(find_by_entity::<AltName>(&mut conn, owner).unwrap(), inserted);
}

#[test]
fn patch_stored_document() {
    use crate::model::entity::Recipe;
    use crate::model::{RecipePatch, RecipeStatus};
    use chrono::TimeZone as _;

    let mut conn = test_connection();
    let inserted_at = Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap();
    let updated_at = Utc.with_ymd_and_hms(2021, 3, 5, 0, 0, 0).unwrap();

    let mut recipe = Recipe {
        name: "Stew".into(),
        notes: "needs salt".into(),
        ..Default::default()
    };
    let id = insert(&mut conn, &mut recipe, Uuid::from_u128(9), inserted_at).unwrap();

    let patches = [
        RecipePatch {
            status: Some(RecipeStatus::Published),
            ..Default::default()
        },
        RecipePatch {
            notes: Some(String::new()),
            ..Default::default()
        },
    ];
    let updated = update(&mut conn, id, &patches, updated_at).unwrap();
    assert_eq!(updated.name, "Stew");
    assert_eq!(updated.notes, "");
    assert_eq!(updated.status, RecipeStatus::Published);
    assert_eq!(updated.date_insert, inserted_at);
    assert_eq!(updated.date_update, updated_at);
    assert_eq!(get::<Recipe>(&mut conn, id).unwrap(), updated);

    let err = update(&mut conn, Uuid::from_u128(1), &patches, updated_at).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn non_finite_amount_is_not_stored() {
    use crate::model::entity::RecipeMeasure;
    use crate::model::RecipeMeasurePatch;

    let mut conn = test_connection();
    let mut measure = RecipeMeasure {
        value: 2.5,
        ..Default::default()
    };
    let id = insert(&mut conn, &mut measure, Uuid::from_u128(9), Utc::now()).unwrap();

    let patch = RecipeMeasurePatch {
        value: Some(f64::NAN),
        ..Default::default()
    };
    let err = update(&mut conn, id, &[patch], Utc::now()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
    assert_eq!(get::<RecipeMeasure>(&mut conn, id).unwrap().value, 2.5);
}
