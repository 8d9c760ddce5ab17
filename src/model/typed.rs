//! Kind-checked attribute references.
//!
//! A typed reference is validated once, when it is built from a descriptor.
//! Joining through it then needs no further kind check, and the join handle
//! it yields is of the matching concrete kind.

use super::{AttributeDescriptor, AttributeKind};
use crate::ast::{CollectionJoin, JoinId, ListJoin, MapJoin, SetJoin, SingularJoin};
use crate::error::PathError;

/// An attribute reference that knows which join handle it produces.
pub trait JoinableAttribute {
    /// Handle type returned when joining or fetching this attribute.
    type Join: Copy + Into<JoinId>;

    /// Kind every value of this type is guaranteed to carry.
    const KIND: AttributeKind;

    /// The validated descriptor.
    fn descriptor(&self) -> &AttributeDescriptor;

    /// Wraps a freshly constructed join node.
    fn wrap_join(id: JoinId) -> Self::Join;
}

macro_rules! typed_attribute {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $join:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(AttributeDescriptor);

        impl $name {
            /// The validated descriptor.
            pub fn descriptor(&self) -> &AttributeDescriptor {
                &self.0
            }

            /// Attribute name.
            pub fn name(&self) -> &str {
                &self.0.name
            }
        }

        impl TryFrom<AttributeDescriptor> for $name {
            type Error = PathError;

            fn try_from(descriptor: AttributeDescriptor) -> Result<Self, Self::Error> {
                descriptor.expect_kind(AttributeKind::$kind)?;
                Ok(Self(descriptor))
            }
        }

        impl JoinableAttribute for $name {
            type Join = $join;
            const KIND: AttributeKind = AttributeKind::$kind;

            fn descriptor(&self) -> &AttributeDescriptor {
                &self.0
            }

            fn wrap_join(id: JoinId) -> $join {
                $join::new(id)
            }
        }
    };
}

typed_attribute!(
    /// Reference to a singular (to-one or embedded) attribute.
    SingularAttribute,
    Singular,
    SingularJoin
);
typed_attribute!(
    /// Reference to an unordered, duplicate-permitting collection attribute.
    CollectionAttribute,
    Collection,
    CollectionJoin
);
typed_attribute!(
    /// Reference to an indexed list attribute.
    ListAttribute,
    List,
    ListJoin
);
typed_attribute!(
    /// Reference to a set attribute.
    SetAttribute,
    Set,
    SetJoin
);
typed_attribute!(
    /// Reference to a map attribute.
    MapAttribute,
    Map,
    MapJoin
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeModel, InMemoryAttributeModel, TypeRef};

    #[test]
    fn typed_reference_accepts_matching_kind() {
        let model = InMemoryAttributeModel::example();
        let lines = model
            .resolve(&TypeRef::new("Order"), "lines")
            .and_then(SetAttribute::try_from)
            .expect("lines is a set");
        assert_eq!(lines.name(), "lines");
        assert_eq!(<SetAttribute as JoinableAttribute>::KIND, AttributeKind::Set);
    }

    #[test]
    fn typed_reference_rejects_other_kinds() {
        let model = InMemoryAttributeModel::example();
        let descriptor = model
            .resolve(&TypeRef::new("Order"), "lines")
            .expect("lines resolves");

        let err = ListAttribute::try_from(descriptor.clone()).expect_err("set is not a list");
        assert_eq!(err.code(), "path::attribute_kind_mismatch");
        assert!(MapAttribute::try_from(descriptor.clone()).is_err());
        assert!(CollectionAttribute::try_from(descriptor.clone()).is_err());
        assert!(SingularAttribute::try_from(descriptor).is_err());
    }
}
