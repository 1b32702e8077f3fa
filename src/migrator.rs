use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_salesmen_table::Migration),
            Box::new(m20241001_000002_create_parties_table::Migration),
            Box::new(m20241001_000003_create_quotation_forms_table::Migration),
            Box::new(m20241017_000004_create_quotation_sequences_table::Migration),
        ]
    }
}

// Migration implementations

mod m20241001_000001_create_salesmen_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000001_create_salesmen_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Salesmen::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Salesmen::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Salesmen::FirstName).string().not_null())
                        .col(ColumnDef::new(Salesmen::LastName).string().null())
                        .col(ColumnDef::new(Salesmen::Email).string().null())
                        .col(ColumnDef::new(Salesmen::MobileNumber).string().null())
                        .col(
                            ColumnDef::new(Salesmen::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Salesmen::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Salesmen {
        Table,
        Id,
        FirstName,
        LastName,
        Email,
        MobileNumber,
        CreatedAt,
    }
}

mod m20241001_000002_create_parties_table {

    use super::m20241001_000001_create_salesmen_table::Salesmen;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000002_create_parties_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parties::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Parties::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Parties::CustomerName).string().not_null())
                        .col(ColumnDef::new(Parties::MobileNumber).string().null())
                        .col(ColumnDef::new(Parties::BillingAddress).text().null())
                        .col(ColumnDef::new(Parties::State).string().null())
                        .col(ColumnDef::new(Parties::Pincode).big_integer().null())
                        .col(ColumnDef::new(Parties::City).string().null())
                        .col(ColumnDef::new(Parties::ShippingAddress).text().null())
                        .col(ColumnDef::new(Parties::ShippingState).string().null())
                        .col(ColumnDef::new(Parties::ShippingPincode).big_integer().null())
                        .col(ColumnDef::new(Parties::ShippingCity).string().null())
                        .col(ColumnDef::new(Parties::GstIn).string().null())
                        .col(ColumnDef::new(Parties::SalesmanId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Parties::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parties_salesman_id")
                                .from(Parties::Table, Parties::SalesmanId)
                                .to(Salesmen::Table, Salesmen::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_parties_salesman_id")
                        .table(Parties::Table)
                        .col(Parties::SalesmanId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parties::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Parties {
        Table,
        Id,
        CustomerName,
        MobileNumber,
        BillingAddress,
        State,
        Pincode,
        City,
        ShippingAddress,
        ShippingState,
        ShippingPincode,
        ShippingCity,
        GstIn,
        SalesmanId,
        CreatedAt,
    }
}

mod m20241001_000003_create_quotation_forms_table {

    use super::m20241001_000001_create_salesmen_table::Salesmen;
    use super::m20241001_000002_create_parties_table::Parties;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000003_create_quotation_forms_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(QuotationForms::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(QuotationForms::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        // Last line of defence against duplicate numbers
                        .col(
                            ColumnDef::new(QuotationForms::QuotationNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(QuotationForms::QuotationDate).date().null())
                        .col(ColumnDef::new(QuotationForms::PaymentTerms).string().null())
                        .col(ColumnDef::new(QuotationForms::DueDate).date().null())
                        .col(ColumnDef::new(QuotationForms::PoNo).string().null())
                        .col(ColumnDef::new(QuotationForms::Lut).boolean().null())
                        .col(
                            ColumnDef::new(QuotationForms::PartyId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuotationForms::SalesmanId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuotationForms::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(QuotationForms::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_quotation_forms_party_id")
                                .from(QuotationForms::Table, QuotationForms::PartyId)
                                .to(Parties::Table, Parties::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_quotation_forms_salesman_id")
                                .from(QuotationForms::Table, QuotationForms::SalesmanId)
                                .to(Salesmen::Table, Salesmen::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_quotation_forms_party_id")
                        .table(QuotationForms::Table)
                        .col(QuotationForms::PartyId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(QuotationForms::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum QuotationForms {
        Table,
        Id,
        QuotationNumber,
        QuotationDate,
        PaymentTerms,
        DueDate,
        PoNo,
        Lut,
        PartyId,
        SalesmanId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20241017_000004_create_quotation_sequences_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241017_000004_create_quotation_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(QuotationSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(QuotationSequences::FinancialYear)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(QuotationSequences::LastSerial)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(QuotationSequences::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(QuotationSequences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum QuotationSequences {
        Table,
        FinancialYear,
        LastSerial,
        UpdatedAt,
    }
}
