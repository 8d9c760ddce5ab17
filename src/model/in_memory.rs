//! In-memory attribute model for tests and embedding.

use super::{AttributeDescriptor, AttributeKind, AttributeModel, TypeCategory, TypeRef};
use crate::error::{PathError, PathResult};
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct ManagedType {
    category: TypeCategory,
    supertypes: Vec<TypeRef>,
    attributes: HashMap<SmolStr, AttributeDescriptor>,
}

/// Attribute model held entirely in memory.
///
/// Basic types do not need to be registered: any type that is not an entity
/// or embeddable is reported as [`TypeCategory::Basic`] once it has been
/// mentioned as an attribute target.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttributeModel {
    types: HashMap<TypeRef, ManagedType>,
    basic_types: HashSet<TypeRef>,
}

impl InMemoryAttributeModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fluent builder.
    pub fn builder() -> AttributeModelBuilder {
        AttributeModelBuilder::new()
    }

    /// Registers a managed (entity or embeddable) type.
    pub fn add_type(&mut self, ty: impl Into<TypeRef>, category: TypeCategory) {
        let ty = ty.into();
        if category.is_basic() {
            self.basic_types.insert(ty);
            return;
        }
        self.types.entry(ty).or_insert_with(|| ManagedType {
            category,
            supertypes: Vec::new(),
            attributes: HashMap::new(),
        });
    }

    /// Declares `supertype` as a direct supertype of `ty`.
    pub fn add_supertype(&mut self, ty: impl Into<TypeRef>, supertype: impl Into<TypeRef>) {
        if let Some(managed) = self.types.get_mut(&ty.into()) {
            managed.supertypes.push(supertype.into());
        }
    }

    /// Adds an attribute to its declaring type, registering the declaring type
    /// as an entity if it is not known yet.
    pub fn add_attribute(&mut self, attribute: AttributeDescriptor) {
        if attribute.element_category.is_basic() {
            self.basic_types.insert(attribute.element_type.clone());
        }
        if let (Some(key), Some(TypeCategory::Basic)) = (&attribute.key_type, attribute.key_category)
        {
            self.basic_types.insert(key.clone());
        }
        let managed = self
            .types
            .entry(attribute.declaring_type.clone())
            .or_insert_with(|| ManagedType {
                category: TypeCategory::Entity,
                supertypes: Vec::new(),
                attributes: HashMap::new(),
            });
        managed.attributes.insert(attribute.name.clone(), attribute);
    }

    /// Order/OrderLine/Product/Customer fixture used by tests and benchmarks.
    ///
    /// - `Order`: `customer` (singular Customer), `lines` (set of OrderLine),
    ///   `payments` (list of Payment), `notes` (collection of String),
    ///   `linesBySku` (map String -> OrderLine), `tags` (set of String),
    ///   `number` (String), `shippingAddress` (embeddable Address)
    /// - `OrderLine`: `product` (singular Product), `quantity` (int), `order`
    /// - `Product`: `name` (String), `supplier` (Customer)
    /// - `Customer`: `name` (String), `orders` (collection of Order),
    ///   `address` (embeddable Address)
    /// - `Address`: `city`, `street` (String)
    /// - `Payment`: `amount` (decimal)
    /// - `SpecialOrder` extends `Order` with `priority` (int)
    pub fn example() -> Self {
        use TypeCategory::{Basic, Embeddable, Entity};

        AttributeModelBuilder::new()
            .entity("Order")
            .entity("SpecialOrder")
            .entity("OrderLine")
            .entity("Product")
            .entity("Customer")
            .entity("Payment")
            .embeddable("Address")
            .supertype("SpecialOrder", "Order")
            .singular("Order", "number", "String", Basic)
            .singular("Order", "customer", "Customer", Entity)
            .singular("Order", "shippingAddress", "Address", Embeddable)
            .plural("Order", "lines", AttributeKind::Set, "OrderLine", Entity)
            .plural("Order", "payments", AttributeKind::List, "Payment", Entity)
            .plural("Order", "notes", AttributeKind::Collection, "String", Basic)
            .plural("Order", "tags", AttributeKind::Set, "String", Basic)
            .map("Order", "linesBySku", ("String", Basic), ("OrderLine", Entity))
            .singular("SpecialOrder", "priority", "int", Basic)
            .singular("OrderLine", "product", "Product", Entity)
            .singular("OrderLine", "quantity", "int", Basic)
            .singular("OrderLine", "order", "Order", Entity)
            .singular("Product", "name", "String", Basic)
            .singular("Product", "supplier", "Customer", Entity)
            .singular("Customer", "name", "String", Basic)
            .singular("Customer", "address", "Address", Embeddable)
            .plural("Customer", "orders", AttributeKind::Collection, "Order", Entity)
            .singular("Address", "city", "String", Basic)
            .singular("Address", "street", "String", Basic)
            .singular("Payment", "amount", "decimal", Basic)
            .build()
    }

    fn find_attribute(
        &self,
        owner: &TypeRef,
        name: &str,
        visited: &mut HashSet<TypeRef>,
    ) -> Option<&AttributeDescriptor> {
        // Guard against cyclic supertype declarations.
        if !visited.insert(owner.clone()) {
            return None;
        }
        let managed = self.types.get(owner)?;
        if let Some(attribute) = managed.attributes.get(name) {
            return Some(attribute);
        }
        managed
            .supertypes
            .iter()
            .find_map(|parent| self.find_attribute(parent, name, visited))
    }
}

impl AttributeModel for InMemoryAttributeModel {
    fn resolve(&self, declaring_type: &TypeRef, name: &str) -> PathResult<AttributeDescriptor> {
        let mut visited = HashSet::new();
        self.find_attribute(declaring_type, name, &mut visited)
            .cloned()
            .ok_or_else(|| PathError::UnknownAttribute {
                declaring_type: declaring_type.name_str(),
                attribute: name.into(),
            })
    }

    fn type_category(&self, ty: &TypeRef) -> Option<TypeCategory> {
        match self.types.get(ty) {
            Some(managed) => Some(managed.category),
            None if self.basic_types.contains(ty) => Some(TypeCategory::Basic),
            None => None,
        }
    }

    fn supertypes(&self, ty: &TypeRef) -> &[TypeRef] {
        self.types
            .get(ty)
            .map(|managed| managed.supertypes.as_slice())
            .unwrap_or(&[])
    }
}

/// Fluent builder for [`InMemoryAttributeModel`].
#[derive(Debug, Default)]
pub struct AttributeModelBuilder {
    model: InMemoryAttributeModel,
}

impl AttributeModelBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type.
    pub fn entity(mut self, name: &str) -> Self {
        self.model.add_type(name, TypeCategory::Entity);
        self
    }

    /// Registers an embeddable type.
    pub fn embeddable(mut self, name: &str) -> Self {
        self.model.add_type(name, TypeCategory::Embeddable);
        self
    }

    /// Declares `supertype` as a direct supertype of `ty`.
    pub fn supertype(mut self, ty: &str, supertype: &str) -> Self {
        self.model.add_supertype(ty, supertype);
        self
    }

    /// Adds a singular attribute.
    pub fn singular(mut self, owner: &str, name: &str, target: &str, category: TypeCategory) -> Self {
        self.model
            .add_attribute(AttributeDescriptor::singular(owner, name, target, category));
        self
    }

    /// Adds a collection, list or set attribute.
    pub fn plural(
        mut self,
        owner: &str,
        name: &str,
        kind: AttributeKind,
        element: &str,
        category: TypeCategory,
    ) -> Self {
        self.model.add_attribute(AttributeDescriptor::plural(
            owner, name, kind, element, category,
        ));
        self
    }

    /// Adds a map attribute.
    pub fn map(
        mut self,
        owner: &str,
        name: &str,
        key: (&str, TypeCategory),
        value: (&str, TypeCategory),
    ) -> Self {
        self.model.add_attribute(AttributeDescriptor::map(
            owner,
            name,
            (TypeRef::new(key.0), key.1),
            (TypeRef::new(value.0), value.1),
        ));
        self
    }

    /// Finishes the model.
    pub fn build(self) -> InMemoryAttributeModel {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_declared_attribute() {
        let model = InMemoryAttributeModel::example();
        let lines = model
            .resolve(&TypeRef::new("Order"), "lines")
            .expect("lines should resolve");
        assert_eq!(lines.kind, AttributeKind::Set);
        assert_eq!(lines.element_type, TypeRef::new("OrderLine"));
        assert!(!lines.is_element_basic());
    }

    #[test]
    fn resolves_inherited_attribute() {
        let model = InMemoryAttributeModel::example();
        let lines = model
            .resolve(&TypeRef::new("SpecialOrder"), "lines")
            .expect("inherited attribute should resolve");
        assert_eq!(lines.declaring_type, TypeRef::new("Order"));
        assert!(model.is_assignable(&TypeRef::new("SpecialOrder"), &TypeRef::new("Order")));
        assert!(!model.is_assignable(&TypeRef::new("Order"), &TypeRef::new("SpecialOrder")));
    }

    #[test]
    fn unknown_attribute_is_reported() {
        let model = InMemoryAttributeModel::example();
        let err = model
            .resolve(&TypeRef::new("Order"), "missing")
            .expect_err("missing attribute must fail");
        assert_eq!(
            err,
            PathError::UnknownAttribute {
                declaring_type: "Order".into(),
                attribute: "missing".into(),
            }
        );
    }

    #[test]
    fn cyclic_supertypes_terminate() {
        let model = AttributeModelBuilder::new()
            .entity("A")
            .entity("B")
            .supertype("A", "B")
            .supertype("B", "A")
            .build();
        assert!(model.resolve(&TypeRef::new("A"), "nothing").is_err());
        assert!(!model.is_assignable(&TypeRef::new("A"), &TypeRef::new("C")));
    }

    #[test]
    fn categories_include_mentioned_basic_types() {
        let model = InMemoryAttributeModel::example();
        assert_eq!(
            model.type_category(&TypeRef::new("Order")),
            Some(TypeCategory::Entity)
        );
        assert_eq!(
            model.type_category(&TypeRef::new("Address")),
            Some(TypeCategory::Embeddable)
        );
        assert_eq!(
            model.type_category(&TypeRef::new("String")),
            Some(TypeCategory::Basic)
        );
        assert_eq!(model.type_category(&TypeRef::new("Nope")), None);
    }
}
