use log::LevelFilter;
use env_logger::Builder;
use std::io::Write;
use chrono::Local;

pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let _ = Builder::new()
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_default_env()
        .try_init();

    log::debug!("Logger initialized at {}.", level);
}
