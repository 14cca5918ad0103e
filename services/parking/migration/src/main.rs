use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(parklot_parking_migration::Migrator).await;
}
