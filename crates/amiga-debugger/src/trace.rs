//! Diagnostic output, enabled with `AMIGA_DEBUGGER_TRACE`.

use std::sync::OnceLock;

pub(crate) fn enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os("AMIGA_DEBUGGER_TRACE").is_some())
}
