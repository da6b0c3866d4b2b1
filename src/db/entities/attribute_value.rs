use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One item's value for one column definition. Rows are sparse: a missing
/// row means the cell is empty.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attribute_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: i64,
    pub definition_id: i64,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::column_definition::Entity",
        from = "Column::DefinitionId",
        to = "super::column_definition::Column::Id"
    )]
    ColumnDefinition,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::column_definition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ColumnDefinition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
