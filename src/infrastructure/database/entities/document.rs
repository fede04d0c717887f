//! Stored document row

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One JSON document of one collection
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Insertion sequence; also the default result order
    #[sea_orm(primary_key)]
    pub seq: i64,

    /// Collection name (`categories`, `base_services`, ...)
    pub collection: String,

    /// Document id, unique within its collection
    pub doc_id: String,

    /// JSON body
    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
