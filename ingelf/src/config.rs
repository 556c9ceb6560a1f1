use std::{
    env,
    str::FromStr,
};

use crate::{
    diagnostics,
    process,
    server,
    Error,
};

#[derive(Debug, Default, Clone)]
pub struct Config {
    pub process: process::Config,
    pub server: server::Config,
    pub diagnostics: diagnostics::Config,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Config::from_vars(|name| env::var(name))
    }

    fn from_vars(var: impl Fn(&str) -> Result<String, env::VarError>) -> Result<Self, Error> {
        let mut config = Config::default();

        read_var(&var, &mut config.server.bind, "GELF_BIND")?;
        read_var(&var, &mut config.server.port, "GELF_PORT")?;

        read_var(&var, &mut config.process.tag, "GELF_TAG")?;
        read_var(
            &var,
            &mut config.process.trust_client_timestamp,
            "GELF_TRUST_CLIENT_TIMESTAMP",
        )?;
        read_var(
            &var,
            &mut config.process.client_timestamp_to_i,
            "GELF_CLIENT_TIMESTAMP_TO_I",
        )?;
        read_var(
            &var,
            &mut config.process.remove_timestamp_record,
            "GELF_REMOVE_TIMESTAMP_RECORD",
        )?;
        read_var(
            &var,
            &mut config.process.strip_leading_underscore,
            "GELF_STRIP_LEADING_UNDERSCORE",
        )?;

        if is_truthy(&var, "GELF_ENABLE_DIAGNOSTICS")? {
            config.diagnostics.min_level = diagnostics::Level::Debug;
        }

        Ok(config)
    }
}

fn is_truthy(
    var: impl Fn(&str) -> Result<String, env::VarError>,
    name: &str,
) -> Result<bool, Error> {
    match var(name) {
        // The evironment variable contains a truthy value
        Ok(ref v) if v == "True" || v == "true" => Ok(true),
        // The environment variable is not set or doesn't contain
        // a truthy value
        Ok(_) | Err(env::VarError::NotPresent) => Ok(false),
        // The environment variable is invalid
        Err(e) => Err(e.into()),
    }
}

fn read_var<T>(
    var: impl Fn(&str) -> Result<String, env::VarError>,
    into: &mut T,
    name: &str,
) -> Result<(), Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        // The environment variable exists, but is empty
        Ok(ref v) if v.is_empty() => Ok(()),
        // The environment variable does not exist
        Err(env::VarError::NotPresent) => Ok(()),
        // The environment variable is invalid
        Err(e) => Err(e.into()),
        // The environment variable has a value
        Ok(v) => {
            *into = T::from_str(&v).map_err(|e| {
                Error::new(e).context(format!("invalid value {:?} for {}", v, name))
            })?;

            Ok(())
        }
    }
}
