// Copyright 2023 Remi Bernotavicius

//! Applying partial updates onto existing records.
//!
//! There are two ways in. [`apply`] takes typed patches whose fields are
//! checked against the target at compile time (see [`impl_patch!`]); this is
//! what the store uses. [`update`] works on any pair of serde types and
//! matches fields by their serialized name at run time.
//!
//! [`impl_patch!`]: crate::impl_patch

mod fields;

pub use fields::{update, MergeError};

/// A partial record that knows how to write itself onto a `Target`.
pub trait Patch {
    type Target;

    fn apply_to(&self, target: &mut Self::Target);
}

/// How a single patch field lands on the target field.
///
/// `Option` fields are applied when `Some`, even when they hold an empty or
/// zero value, so a patch can clear a field. Plain `bool` fields are always
/// applied.
pub trait PatchField<T> {
    fn merge_into(&self, slot: &mut T);
}

impl<T: Clone> PatchField<T> for Option<T> {
    fn merge_into(&self, slot: &mut T) {
        if let Some(value) = self {
            *slot = value.clone();
        }
    }
}

impl PatchField<bool> for bool {
    fn merge_into(&self, slot: &mut bool) {
        *slot = *self;
    }
}

/// Implements [`Patch`] by copying each listed field onto the field of the same
/// name on the target. A name the target doesn't have is a compile error.
///
/// ```ignore
/// impl_patch!(RecipePatch => Recipe { name, description, status });
/// ```
#[macro_export]
macro_rules! impl_patch {
    ($patch:ty => $target:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::merge::Patch for $patch {
            type Target = $target;

            fn apply_to(&self, target: &mut $target) {
                $($crate::merge::PatchField::merge_into(&self.$field, &mut target.$field);)+
            }
        }
    };
}

/// Applies `patches` to `target` in order; later patches win.
pub fn apply<'t, P: Patch>(target: &'t mut P::Target, patches: &[P]) -> &'t mut P::Target {
    for patch in patches {
        patch.apply_to(target);
    }
    target
}

#[cfg(test)]
#[derive(Debug, Default, Clone, PartialEq)]
struct Toggle {
    name: String,
    count: u32,
    status: bool,
}

#[cfg(test)]
#[derive(Default)]
struct TogglePatch {
    name: Option<String>,
    count: Option<u32>,
    status: bool,
}

#[cfg(test)]
crate::impl_patch!(TogglePatch => Toggle { name, count, status });

#[test]
fn typed_patch_booleans_always_apply() {
    let mut target = Toggle {
        name: "name".into(),
        count: 3,
        status: true,
    };
    apply(&mut target, &[TogglePatch::default()]);
    assert_eq!(
        target,
        Toggle {
            name: "name".into(),
            count: 3,
            status: false,
        }
    );

    apply(
        &mut target,
        &[TogglePatch {
            status: true,
            ..Default::default()
        }],
    );
    assert!(target.status);
}

#[test]
fn typed_patch_presence() {
    let mut target = Toggle {
        name: "name".into(),
        count: 3,
        status: true,
    };
    let patches = [
        TogglePatch {
            name: Some("first".into()),
            count: Some(10),
            status: true,
        },
        TogglePatch {
            name: Some("second".into()),
            count: None,
            status: true,
        },
        TogglePatch {
            name: None,
            count: Some(0),
            status: true,
        },
    ];
    let result = apply(&mut target, &patches);
    assert_eq!(result.name, "second");
    assert_eq!(result.count, 0);

    apply(
        &mut target,
        &[TogglePatch {
            name: Some(String::new()),
            status: true,
            ..Default::default()
        }],
    );
    assert_eq!(target.name, "");
}
