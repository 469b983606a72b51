use sea_query::Iden;

/// Metadata table - key-value store for database configuration
#[derive(Iden)]
pub enum Metadata {
    Table,
    Key,
    Value,
}

/// Drink log table - one row per recorded drink, columns mirror the sheet
#[derive(Iden)]
pub enum DrinkLog {
    Table,
    Id,
    Date,
    DrinkType,
    Amount,
    AlcoholG,
}
