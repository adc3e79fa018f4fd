use std::{io, process};

use mdprint::{
    application::{convert::DocumentConverter, error::AppError, render::render_service},
    config,
    infra::{error::InfraError, telemetry},
    presentation::report,
};
use time::OffsetDateTime;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let _ = report::write_failure(&mut io::stderr().lock(), &error.report());

    if dispatcher::has_been_set() {
        error!(target = "mdprint", error = %error, "conversion failed");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(target = "mdprint", error = %error, "conversion failed");
    });
}

fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli().map_err(|err| {
        InfraError::configuration(format!("failed to load configuration: {err}"))
    })?;

    telemetry::init(&settings.logging)?;

    info!(
        target = "mdprint",
        source = %settings.paths.source_path().display(),
        output = %settings.paths.output_path().display(),
        "Starting conversion"
    );

    // The local offset is unavailable on some platforms once threads exist.
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());

    let converter = DocumentConverter::new(render_service(), &settings);
    let conversion = converter.convert_file(&settings.paths, now)?;

    report::write_success(&mut io::stdout().lock(), &conversion).map_err(InfraError::from)?;
    Ok(())
}
