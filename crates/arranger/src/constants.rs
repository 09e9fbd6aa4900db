/// Measure increments used when handing out leftover measures
pub const EVEN_INCREMENT: u64 = 2; // even sections grow in pairs of bars
pub const SINGLE_INCREMENT: u64 = 1;

/// Label of the synthetic trailing entry holding sub-measure leftovers
pub const FADE_LABEL: &str = "Fade";

/// Largest count of beats or measures the allocator handles (2^53, exact in f64)
pub const MAX_EXACT_COUNT: f64 = 9_007_199_254_740_992.0;

/// Time unit conversion
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Front-end defaults
pub const DEFAULT_BEATS_PER_MEASURE: f64 = 4.0; // 4/4
pub const NAME_COLUMN_WIDTH: usize = 10; // text output: section name column
pub const LENGTH_COLUMN_WIDTH: usize = 9; // text output: " N bars" column

/// CSV output headers
pub const SECTION_HEADER: &str = "section";
pub const MEASURES_HEADER: &str = "measures";
pub const BEATS_HEADER: &str = "beats";
