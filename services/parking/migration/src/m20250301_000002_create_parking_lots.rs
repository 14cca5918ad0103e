use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingLots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingLots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParkingLots::PrimeLocationName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingLots::Price).double().not_null())
                    .col(ColumnDef::new(ParkingLots::Address).string().not_null())
                    .col(ColumnDef::new(ParkingLots::PinCode).big_integer().not_null())
                    .col(
                        ColumnDef::new(ParkingLots::MaximumNumberOfSpots)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingLots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ParkingLots {
    Table,
    Id,
    PrimeLocationName,
    Price,
    Address,
    PinCode,
    MaximumNumberOfSpots,
}
