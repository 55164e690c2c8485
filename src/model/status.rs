// Copyright 2023 Remi Bernotavicius

//! Lifecycle status codes. Every entity type gets its own closed set so a
//! status can never be moved from one kind of record to another.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $on:ident => $on_token:tt,
            $off:ident => $off_token:tt $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Display, EnumIter, Default, Hash, Copy, Clone, PartialEq, Eq)]
        #[derive(Serialize, Deserialize)]
        pub enum $name {
            #[display($on_token)]
            #[serde(rename = $on_token)]
            $on,
            #[default]
            #[display($off_token)]
            #[serde(rename = $off_token)]
            $off,
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    Self::$on => $on_token,
                    Self::$off => $off_token,
                }
            }

            pub fn iter() -> impl Iterator<Item = Self> {
                <Self as strum::IntoEnumIterator>::iter()
            }
        }
    };
}

status_enum! {
    AltNameStatus {
        Published => "published",
        Unpublished => "unpublished",
    }
}

status_enum! {
    CategoryStatus {
        Published => "published",
        Unpublished => "unpublished",
    }
}

status_enum! {
    IngredientStatus {
        Published => "published",
        Unpublished => "unpublished",
    }
}

status_enum! {
    PictureStatus {
        Published => "published",
        Unpublished => "unpublished",
    }
}

status_enum! {
    UnitStatus {
        Published => "published",
        Unpublished => "unpublished",
    }
}

status_enum! {
    /// Only published recipes are meant to be offered to other users.
    RecipeStatus {
        Published => "published",
        Unpublished => "unpublished",
    }
}

status_enum! {
    RecipeProcessStatus {
        Published => "published",
        Unpublished => "unpublished",
    }
}

status_enum! {
    RecipeCategoryStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

status_enum! {
    RecipeIngredientStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

status_enum! {
    RecipeMeasureStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

status_enum! {
    PlannerStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

status_enum! {
    PlannerIntervalStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

status_enum! {
    PlannerRecipeStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

#[test]
fn status_tokens() {
    use maplit::hashmap;

    let expected = hashmap! {
        RecipeStatus::Published => "published",
        RecipeStatus::Unpublished => "unpublished",
    };
    for status in RecipeStatus::iter() {
        assert_eq!(status.as_str(), expected[&status]);
        assert_eq!(status.to_string(), expected[&status]);
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            format!("\"{}\"", expected[&status])
        );
    }

    assert_eq!(PlannerStatus::iter().count(), 2);
    assert_eq!(PlannerStatus::default(), PlannerStatus::Inactive);
    assert_eq!(PictureStatus::default(), PictureStatus::Unpublished);
}

#[test]
fn status_decoding_is_case_sensitive() {
    let status: PlannerRecipeStatus = serde_json::from_str("\"active\"").unwrap();
    assert_eq!(status, PlannerRecipeStatus::Active);

    assert!(serde_json::from_str::<PlannerRecipeStatus>("\"Active\"").is_err());
    assert!(serde_json::from_str::<PlannerRecipeStatus>("\"ACTIVE\"").is_err());
    assert!(serde_json::from_str::<PlannerRecipeStatus>("\"published\"").is_err());
    assert!(serde_json::from_str::<PlannerRecipeStatus>("1").is_err());
}
