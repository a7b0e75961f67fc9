pub const UNRESOLVED_MODULE: &str = "UNRESOLVED_MODULE";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const DUPLICATE_BINDING: &str = "DUPLICATE_BINDING";
pub const DUPLICATE_EXPORT: &str = "DUPLICATE_EXPORT";
pub const MISSING_EXPORT: &str = "MISSING_EXPORT";
pub const RENAME_CONFLICT: &str = "RENAME_CONFLICT";
pub const SYMBOL_NOT_FOUND: &str = "SYMBOL_NOT_FOUND";

// --- Jetpack specific
pub const IO_ERROR: &str = "IO_ERROR";
pub const PANIC: &str = "PANIC";
