use console::style;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

/// Install the process-wide logger.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` switches between info and
/// debug output. Calling this more than once keeps the first logger.
pub fn init(verbose: bool) {
    let default_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let mut builder = Builder::from_env(Env::default());
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(default_level);
    }

    builder.format(|buf, record| writeln!(buf, "{} {}", level_tag(record.level()), record.args()));

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}

fn level_tag(level: Level) -> String {
    match level {
        Level::Error => style("[ERROR]").red().bold().to_string(),
        Level::Warn => style("[WARNING]").yellow().bold().to_string(),
        Level::Info => style("[INFO]").cyan().to_string(),
        Level::Debug | Level::Trace => style("[VERBOSE]").dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(true);
        init(false);
        log::info!("still logging");
    }

    #[test]
    fn test_level_tags() {
        console::set_colors_enabled(false);
        assert_eq!(level_tag(Level::Warn), "[WARNING]");
        assert_eq!(level_tag(Level::Trace), "[VERBOSE]");
        assert_eq!(level_tag(Level::Error), "[ERROR]");
    }
}
