//! # Union Shape Fix
//!
//! `core_course_get_contents` declares `modules[].activitybadge` as an object, but the
//! server answers with an empty list when a module has no badge. The fix rewrites that
//! single field into "object or list of that object" before synthesis.

use crate::descriptor::{Descriptor, Shape};
use crate::method::MethodSet;
use serde_json::Value;

/// Location of a field that may be returned either as an object or as a list.
///
/// The return descriptor is a list of objects; `wrapper` is a list-of-objects field of
/// those items and `target` a field of the wrapper's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionShapeFix {
    /// Method identifier.
    pub method: &'static str,
    /// Field of the returned items holding the wrapper list.
    pub wrapper: &'static str,
    /// Field of the wrapper's items to turn into a union.
    pub target: &'static str,
}

/// The activity badge of course modules.
pub const ACTIVITY_BADGE_FIX: UnionShapeFix = UnionShapeFix {
    method: "core_course_get_contents",
    wrapper: "modules",
    target: "activitybadge",
};

impl UnionShapeFix {
    /// Applies the fix to `methods`. Returns whether the target field was found.
    pub fn apply(&self, methods: &mut MethodSet) -> bool {
        methods
            .get_mut(self.method)
            .is_some_and(|method| self.apply_to_returns(&mut method.returns))
    }

    /// Applies the fix to a return descriptor. A missing or differently shaped path
    /// leaves the descriptor untouched.
    pub fn apply_to_returns(&self, returns: &mut Descriptor) -> bool {
        let Some(field) = returns
            .item_mut()
            .and_then(Descriptor::keys_mut)
            .and_then(|keys| keys.get_mut(self.wrapper))
            .and_then(Descriptor::item_mut)
            .and_then(Descriptor::keys_mut)
            .and_then(|keys| keys.get_mut(self.target))
        else {
            return false;
        };

        let original = std::mem::take(field);
        *field = object_or_list(original);
        true
    }
}

/// Wraps `original` into a union of itself and a list of itself.
///
/// The union node keeps an empty envelope; the list alternative copies description,
/// required and nullability from `original` and defaults to an empty list.
fn object_or_list(original: Descriptor) -> Descriptor {
    let as_list = Descriptor {
        description: original.description.clone(),
        default: Some(Value::Array(Vec::new())),
        required: original.required,
        allow_null: original.allow_null,
        shape: Shape::List(Box::new(original.clone())),
    };
    Descriptor::union(vec![original, as_list])
}
