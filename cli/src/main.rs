use std::process::ExitCode;

use anyhow::Result;
use env_logger::Env;
use localpostman_cli::{exit_code, parse_options, report, ReqwestTransport};
use localpostman_core::Dispatcher;

fn main() -> Result<ExitCode> {
    let options = parse_options();
    let level = if options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let form = options.to_form()?;
    let dispatcher = Dispatcher::new(ReqwestTransport::new()?);
    let outcome = dispatcher.run(&form);

    if options.token_only {
        match localpostman_cli::report::token(&outcome) {
            Some(token) => println!("{token}"),
            None => {
                eprintln!("no token found in the response");
                return Ok(ExitCode::from(2));
            }
        }
    } else {
        println!("{}", report(&outcome));
    }
    Ok(ExitCode::from(exit_code(&outcome)))
}
