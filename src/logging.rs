pub fn setup_logging(conf: &crate::config::LoggingConfig) -> Result<(), String> {
    let mut logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(conf.level);

    // stdout belongs to the command we exec into
    if conf.log_to_stderr {
        logger = logger.chain(std::io::stderr());
    }

    logger
        .apply()
        .map_err(|e| format!("Error while setting up logger: {}", e))
}
