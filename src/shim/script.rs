//! Wrapper script rendering.
//!
//! The script resolves its prefix at run time, so a relocated sysroot keeps
//! working as long as HPKG_PREFIX points at the new location.

use std::path::Path;

use crate::common::write_file_atomic;
use crate::error::Result;

/// Interpreter line of every generated wrapper.
pub const INTERPRETER: &str = "#!/system/bin/sh";
/// Program that loads foreign-environment binaries.
pub const LOADER: &str = "loader";

const TEMPLATE: &str = r#"HPKG_PREFIX="${HPKG_PREFIX:-$HOME/.hapkg}"
REAL_BIN="@REAL_BIN@"

export HPKG_PREFIX
if [ -d "$HPKG_PREFIX/sysroot/lib" ]; then
    if [ -n "$LD_LIBRARY_PATH" ]; then
        LD_LIBRARY_PATH="$HPKG_PREFIX/sysroot/lib:$LD_LIBRARY_PATH"
    else
        LD_LIBRARY_PATH="$HPKG_PREFIX/sysroot/lib"
    fi
fi
if [ -d "$HPKG_PREFIX/sysroot/usr/lib" ]; then
    if [ -n "$LD_LIBRARY_PATH" ]; then
        LD_LIBRARY_PATH="$HPKG_PREFIX/sysroot/usr/lib:$LD_LIBRARY_PATH"
    else
        LD_LIBRARY_PATH="$HPKG_PREFIX/sysroot/usr/lib"
    fi
fi
if [ -n "$LD_LIBRARY_PATH" ]; then
    export LD_LIBRARY_PATH
fi

exec @LOADER@ "$REAL_BIN" "$@"
"#;

/// Escape a value for use inside a double-quoted shell string.
fn shell_dquote_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render the wrapper for one real binary. Output is deterministic.
pub fn render_script(real_binary: &Path) -> String {
    let real = shell_dquote_escape(&real_binary.to_string_lossy());
    let body = TEMPLATE
        .replace("@REAL_BIN@", &real)
        .replace("@LOADER@", LOADER);
    format!("{}\n{}", INTERPRETER, body)
}

/// Write the wrapper for `real_binary` to `target`, replacing it atomically.
pub fn write_shim(target: &Path, real_binary: &Path) -> Result<()> {
    write_file_atomic(target, render_script(real_binary), 0o755)
}
