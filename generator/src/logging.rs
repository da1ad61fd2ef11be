//! Logging setup for the source generators
//!
//! Generators log through the `log` facade; binaries pick the backend
//! with one of the init functions here.
//!
//! ```rust,ignore
//! use generator::logging;
//!
//! logging::init();                                   // warnings only
//! logging::init_from_env();                          // honour RUST_LOG
//! logging::init_with_level(log::LevelFilter::Debug); // explicit level
//! ```
//!
//! Levels are used as follows:
//!
//! - `warn!` - a declaration was skipped for a reason the user can fix
//! - `info!` - one line per generator run and per published source
//! - `debug!` - scan decisions (enum kept or skipped, holder found)
//! - `trace!` - individual member values and emitted arms
//!
//! Filter by module when chasing one pipeline:
//!
//! ```bash
//! RUST_LOG=generator::enum_strings=trace sourcegen generate src/
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging at `Warn`. Only the first init call has an effect.
pub fn init() {
    init_with_level(LevelFilter::Warn);
}

/// Initialize logging at a fixed level, ignoring `RUST_LOG`
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize logging from `RUST_LOG`, defaulting to `warn`
pub fn init_from_env() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

/// Initialize logging for tests; safe to call from every test
pub fn init_test() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .is_test(true)
        .try_init();
}

/// Level selected by a repeated `-v` flag: none keeps the default,
/// `-v` shows info and `-vv` or more shows debug.
pub fn level_for_verbosity(verbosity: u8) -> Option<LevelFilter> {
    match verbosity {
        0 => None,
        1 => Some(LevelFilter::Info),
        _ => Some(LevelFilter::Debug),
    }
}
