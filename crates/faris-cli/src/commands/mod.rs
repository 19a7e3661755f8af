//! Command implementations.

pub mod analyze;
pub mod cases;
pub mod preset;
pub mod taxonomy;

pub use self::analyze::execute_analyze;
pub use self::cases::execute_cases;
pub use self::preset::execute_config;
pub use self::taxonomy::execute_taxonomy;
