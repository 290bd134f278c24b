//! Log output and panic reporting.
//!
//! Every WSX crate logs through `tracing`. Nothing is printed until a subscriber is
//! installed; [`init`] installs the default one.

#[cfg(not(target_arch = "wasm32"))]
use std::io::{self, Write};
use std::sync::Once;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriter};

#[cfg(not(target_arch = "wasm32"))]
const LOG_PREFIX: &str = "[wsx] ";

static INSTALLED: Once = Once::new();

/// Installs log output and the panic hook. Later calls do nothing.
///
/// Natively, events go to stderr with a `[wsx]` prefix, filtered by `RUST_LOG`
/// (default `info`), and panics are logged as `tracing` errors before the previous
/// hook runs. In the browser, panics are written to the console.
pub fn init() {
    INSTALLED.call_once(install);
}

#[cfg(not(target_arch = "wasm32"))]
fn install() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(PrefixedWriter)
        .with_ansi(false)
        .without_time()
        .try_init();
    if result.is_err() {
        tracing::debug!("a tracing subscriber is already installed");
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing_panic::panic_hook(info);
        previous(info);
    }));
}

#[cfg(target_arch = "wasm32")]
fn install() {
    console_error_panic_hook::set_once();
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
struct PrefixedWriter;

#[cfg(not(target_arch = "wasm32"))]
impl<'a> MakeWriter<'a> for PrefixedWriter {
    type Writer = Prefixed<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        Prefixed {
            inner: io::stderr(),
            wrote_prefix: false,
        }
    }
}

/// Writes [`LOG_PREFIX`] before the first byte of each event.
#[cfg(not(target_arch = "wasm32"))]
struct Prefixed<W> {
    inner: W,
    wrote_prefix: bool,
}

#[cfg(not(target_arch = "wasm32"))]
impl<W: Write> Write for Prefixed<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.wrote_prefix {
            self.inner.write_all(LOG_PREFIX.as_bytes())?;
            self.wrote_prefix = true;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_written_once_per_event() {
        let mut out = Prefixed {
            inner: Vec::new(),
            wrote_prefix: false,
        };
        out.write_all(b"INFO ").unwrap();
        out.write_all(b"ready\n").unwrap();
        assert_eq!(String::from_utf8(out.inner).unwrap(), "[wsx] INFO ready\n");
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialized");
    }
}
