use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::ColumnKind;
use crate::db::models::ColumnType;

/// A user-defined column scoped to one list.
///
/// The type is stored flattened as `kind` plus optional bounds; use
/// [`Model::column_type`] to get it back as a [`ColumnType`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "column_definitions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub list_id: i64,
    pub name: String,
    pub kind: ColumnKind,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub position: i32,
}

impl Model {
    pub fn column_type(&self) -> ColumnType {
        ColumnType::from_stored(self.kind, self.min_value, self.max_value)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::list::Entity",
        from = "Column::ListId",
        to = "super::list::Column::Id"
    )]
    List,
    #[sea_orm(has_many = "super::attribute_value::Entity")]
    AttributeValues,
}

impl Related<super::list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::List.def()
    }
}

impl Related<super::attribute_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttributeValues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
