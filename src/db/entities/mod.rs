//! SeaORM entities for the list store.
//!
//! One module per table. Foreign keys exist in the schema but nothing
//! cascades at the database level; see `services::deletion_service`.

pub mod attribute_value;
pub mod collection;
pub mod column_definition;
pub mod item;
pub mod list;
pub mod list_sort;
pub mod user;

pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;

    pub use super::collection::Entity as Collection;
    pub use super::collection::Model as CollectionModel;

    pub use super::list::Entity as List;
    pub use super::list::Model as ListModel;

    pub use super::list_sort::Entity as ListSort;
    pub use super::list_sort::Model as ListSortModel;

    pub use super::item::Entity as Item;
    pub use super::item::Model as ItemModel;

    pub use super::column_definition::Entity as ColumnDefinition;
    pub use super::column_definition::Model as ColumnDefinitionModel;

    pub use super::attribute_value::Entity as AttributeValue;
    pub use super::attribute_value::Model as AttributeValueModel;
}
