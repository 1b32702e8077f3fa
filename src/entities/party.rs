use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};

/// Customer a quotation is addressed to, owned by one salesman.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_name: String,
    pub mobile_number: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub billing_address: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<i64>,
    pub city: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub shipping_address: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_pincode: Option<i64>,
    pub shipping_city: Option<String>,
    pub gst_in: Option<String>,
    pub salesman_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::salesman::Entity",
        from = "Column::SalesmanId",
        to = "super::salesman::Column::Id"
    )]
    Salesman,
    #[sea_orm(has_many = "super::quotation_form::Entity")]
    QuotationForms,
}

impl Related<super::salesman::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Salesman.def()
    }
}

impl Related<super::quotation_form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotationForms.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            active_model.created_at = Set(Utc::now());
        }

        Ok(active_model)
    }
}
