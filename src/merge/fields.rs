// Copyright 2023 Remi Bernotavicius

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("update failed: target has no field named {0:?}")]
    UnknownField(String),
    #[error("update failed: {0} does not serialize as a record")]
    NotARecord(&'static str),
    #[error("update failed: {0}")]
    Decode(#[from] serde_json::Error),
}

type Record = Map<String, Value>;

fn into_record(value: impl Serialize, what: &'static str) -> Result<Record, MergeError> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        _ => Err(MergeError::NotARecord(what)),
    }
}

/// Copies the fields of each source onto the same-named field of `target`,
/// source by source.
///
/// A field is copied when it is a boolean, or when it differs from the value it
/// has in `S::default()`. So plain fields left at their zero value are skipped,
/// while `Option` fields are copied whenever they are `Some`. Sources whose
/// default isn't a record, like `serde_json::Value`, have no zero values and
/// every field they carry is copied.
///
/// A source naming a field the target lacks, or carrying a value of the wrong
/// type, fails the whole call. That source applies none of its fields, but
/// sources before it stay applied.
pub fn update<'t, T, S>(target: &'t mut T, sources: &[S]) -> Result<&'t mut T, MergeError>
where
    T: Serialize + DeserializeOwned,
    S: Serialize + Default,
{
    let zero = match serde_json::to_value(S::default())? {
        Value::Object(record) => record,
        _ => Record::new(),
    };

    for (position, source) in sources.iter().enumerate() {
        let mut staged = into_record(&*target, "target")?;
        for (name, value) in into_record(source, "source")? {
            let Some(slot) = staged.get_mut(&name) else {
                log::warn!("rejecting update source {position}: no target field {name:?}");
                return Err(MergeError::UnknownField(name));
            };
            if value.is_boolean() || zero.get(&name) != Some(&value) {
                *slot = value;
            }
        }
        *target = serde_json::from_value(Value::Object(staged)).map_err(|e| {
            log::warn!("rejecting update source {position}: {e}");
            e
        })?;
        log::debug!("applied update source {position}");
    }
    Ok(target)
}

#[cfg(test)]
mod fixtures {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Target {
        pub name: String,
        pub count: u32,
        pub status: bool,
    }

    impl Target {
        pub fn new() -> Self {
            Self {
                name: "name".into(),
                count: 0,
                status: true,
            }
        }
    }

    #[derive(Default, Serialize)]
    pub struct StatusOnly {
        pub status: bool,
    }

    #[derive(Default, Serialize)]
    pub struct IdOnly {
        pub id: Uuid,
    }

    #[derive(Default, Serialize)]
    pub struct Plain {
        pub name: String,
        pub count: u32,
    }

    #[derive(Default, Serialize)]
    pub struct Optional {
        pub name: Option<String>,
        pub count: Option<u32>,
    }

    #[derive(Default, Serialize)]
    pub struct WrongType {
        pub name: u32,
    }
}

#[test]
fn boolean_false_overrides() {
    use fixtures::*;

    let mut target = Target::new();
    let result = update(&mut target, &[StatusOnly { status: false }]).unwrap();
    assert_eq!(
        *result,
        Target {
            name: "name".into(),
            count: 0,
            status: false,
        }
    );
    assert!(!target.status);

    update(&mut target, &[StatusOnly { status: true }]).unwrap();
    assert!(target.status);
}

#[test]
fn unknown_field_fails() {
    use fixtures::*;

    let mut target = Target::new();
    let source = IdOnly {
        id: "00000000-0000-0000-0000-000000000001".parse().unwrap(),
    };
    let err = update(&mut target, &[source]).unwrap_err();
    assert!(matches!(&err, MergeError::UnknownField(name) if name == "id"));
    assert!(err.to_string().starts_with("update failed"));
    assert_eq!(target, Target::new());
}

#[test]
fn zero_values_are_skipped() {
    use fixtures::*;

    let mut target = Target {
        count: 7,
        ..Target::new()
    };
    update(
        &mut target,
        &[Plain {
            name: String::new(),
            count: 0,
        }],
    )
    .unwrap();
    assert_eq!(target.name, "name");
    assert_eq!(target.count, 7);

    update(
        &mut target,
        &[Plain {
            name: "soup".into(),
            count: 0,
        }],
    )
    .unwrap();
    assert_eq!(target.name, "soup");
    assert_eq!(target.count, 7);
}

#[test]
fn later_sources_win() {
    use fixtures::*;

    let mut target = Target::new();
    let sources = [
        Plain {
            name: "v1".into(),
            count: 1,
        },
        Plain {
            name: "v2".into(),
            count: 0,
        },
    ];
    update(&mut target, &sources).unwrap();
    assert_eq!(target.name, "v2");
    assert_eq!(target.count, 1);
}

#[test]
fn optional_fields_use_presence() {
    use fixtures::*;

    let mut target = Target {
        count: 7,
        ..Target::new()
    };
    update(
        &mut target,
        &[Optional {
            name: Some(String::new()),
            count: None,
        }],
    )
    .unwrap();
    assert_eq!(target.name, "");
    assert_eq!(target.count, 7);

    update(
        &mut target,
        &[Optional {
            name: None,
            count: Some(0),
        }],
    )
    .unwrap();
    assert_eq!(target.count, 0);
}

#[test]
fn type_mismatch_is_an_error() {
    use fixtures::*;

    let mut target = Target::new();
    let err = update(&mut target, &[WrongType { name: 5 }]).unwrap_err();
    assert!(matches!(err, MergeError::Decode(_)));
    assert_eq!(target, Target::new());
}

#[test]
fn earlier_sources_stay_applied() {
    use fixtures::*;
    use serde_json::json;

    let mut target = Target::new();
    let sources = [
        json!({ "name": "applied", "count": 0 }),
        json!({ "count": 4, "nope": 1 }),
        json!({ "name": "never" }),
    ];
    let err = update(&mut target, &sources).unwrap_err();
    assert!(matches!(&err, MergeError::UnknownField(name) if name == "nope"));
    assert_eq!(
        target,
        Target {
            name: "applied".into(),
            count: 0,
            status: true,
        }
    );
}

#[test]
fn non_record_source_is_rejected() {
    use fixtures::*;

    let mut target = Target::new();
    let err = update(&mut target, &[serde_json::json!([1, 2])]).unwrap_err();
    assert!(matches!(err, MergeError::NotARecord("source")));
}

#[test]
fn entity_update() {
    use crate::model::entity::Recipe;
    use crate::model::status::RecipeStatus;

    #[derive(Default, serde::Serialize)]
    struct Publish {
        name: Option<String>,
        status: Option<RecipeStatus>,
    }

    let mut recipe = Recipe {
        name: "Soup".into(),
        notes: "salt".into(),
        ..Default::default()
    };
    let before = recipe.clone();
    update(
        &mut recipe,
        &[Publish {
            name: None,
            status: Some(RecipeStatus::Published),
        }],
    )
    .unwrap();
    assert_eq!(recipe.status, RecipeStatus::Published);
    assert_eq!(recipe.name, "Soup");
    assert_eq!(recipe.notes, "salt");
    assert_eq!(recipe.date_insert, before.date_insert);
}
