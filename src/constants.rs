/// Expected database schema version
/// Databases with any other version are refused on open
pub const EXPECTED_DB_VERSION: &str = "1";

/// Fraction of the poured ethanol that counts as absorbed
pub const ABSORPTION_COEFFICIENT: f64 = 0.8;

/// Grams of ethanol cleared per hour per kilogram of body weight
pub const CLEARANCE_RATE_PER_KG: f64 = 0.1;

/// Volumes (ml) the form offers, smallest first
pub const ALLOWED_AMOUNTS_ML: [u32; 7] = [0, 100, 180, 350, 500, 750, 1000];

/// Default volume preselected on the form
pub const DEFAULT_AMOUNT_ML: u32 = 350;

/// Default body weight preselected on the form
pub const DEFAULT_WEIGHT_KG: f64 = 65.0;

/// Lowest body weight the form accepts
pub const MIN_WEIGHT_KG: f64 = 30.0;

/// Default database file when neither config nor CLI names one
pub const DEFAULT_DATABASE_FILE: &str = "drink_log.sqlite";

/// Default HTTP API port
pub const DEFAULT_API_PORT: u16 = 3000;

/// Check whether `amount_ml` is one of the volumes the form offers
pub fn is_allowed_amount(amount_ml: u32) -> bool {
    ALLOWED_AMOUNTS_ML.contains(&amount_ml)
}
