use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Current snapshot schema version. Snapshots carrying any other version are
/// rejected at load time.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Default flat tax rate (IGV) used to gross up tax-exclusive subtotals.
pub const DEFAULT_TAX_RATE: Decimal = dec!(0.18);

/// Default exchange rate, in PEN per 1 USD.
pub const DEFAULT_EXCHANGE_RATE: Decimal = dec!(3.75);

/// Default raw-material safety margin.
pub const DEFAULT_MARGIN_PERCENTAGE: Decimal = dec!(0.02);

/// Maximum attempts for a single snapshot save before giving up.
pub const MAX_SAVE_ATTEMPTS: u32 = 3;

/// Base delay between save retries; doubled on each attempt.
pub const SAVE_RETRY_BASE_DELAY_MS: u64 = 250;
