use std::process;

use ingelf::{
    config::Config,
    diagnostics::{
        self,
        emit,
        emit_err,
    },
    dispatch::{
        Dispatcher,
        Stdout,
    },
    server,
    Error,
};

fn main() {
    let result = run();

    if let Err(err) = &result {
        emit_err(err, "GELF input failed");
    }

    if let Err(err) = diagnostics::stop() {
        emit_err(&err, "GELF diagnostics failed to stop");
    }

    if result.is_err() {
        process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let config = Config::from_env()?;

    diagnostics::init(config.diagnostics);

    let dispatcher = Dispatcher::new(ingelf::process::build(config.process), Stdout);

    let server = server::build(config.server, move |dgram, source| {
        dispatcher.receive(dgram, Some(source)).into_result()
    })?;

    server.run()?;

    emit("GELF input stopped");

    Ok(())
}
