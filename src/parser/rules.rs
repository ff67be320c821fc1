use std::collections::HashSet;
use std::sync::LazyLock;

/// Inline style fragment tagging an operational ORBAT line.
pub const OPERATIONAL_MARKER: &str = "color:#80BFFF";
/// Inline style fragment tagging a training ORBAT line.
pub const TRAINING_MARKER: &str = "color:#40BFFF";

/// Normalised day names. Operational days are checked first.
pub const OPERATIONAL_DAYS: &[&str] = &["martes", "viernes", "sabado"];
pub const TRAINING_DAYS: &[&str] = &["lunes", "miercoles", "jueves"];

/// Directory holding badge images, and the filename infix that marks one.
pub const BADGE_DIR: &str = "pasadores/";
pub const BADGE_SUFFIX: &str = "_pasador";

const INSTRUCTION_CODES: [&str; 24] = [
    "CIAC", "CBAS", "CTAC", "CLID", "CPAR", "CBUC", "JTAC", "CQB",
    "EOD", "FAC", "MED", "RAD", "NAV", "TIR", "AMT", "ING",
    "PIL", "HEL", "BLI", "ART", "LOG", "FOR", "COM", "DMR",
];

static CODE_WHITELIST: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INSTRUCTION_CODES.into_iter().collect());

/// True when `code` (already uppercased) is a known instruction code.
pub fn is_known_code(code: &str) -> bool {
    CODE_WHITELIST.contains(code)
}
