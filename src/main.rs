/*!
A gateway translating JSON requests of the VTN API into UNC IPC requests
to the logical (UPLL) and physical (UPPL) services.

A request document is run as one compound operation over one session:

```sh
$ vtn-gateway -vv -c gateway.ini requests.json
```

Where a request URI of the web API would be dispatched to can be
checked with `--route`:

```sh
$ vtn-gateway -c gateway.ini --route '/tenants/t1?detail=true'
```
*/

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate byteorder;
extern crate ini;
extern crate ipnetwork;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;
extern crate simple_logger;

#[cfg(unix)]
extern crate log_panics;
#[cfg(unix)]
extern crate syslog;

mod compound;
mod conf;
mod factory;
mod ipc;
mod processor;
mod redirect;
mod request;
mod result_code;
mod rollback;
mod structs;
mod unc;

use compound::RequestDocument;
use ipc::TcpClientSession;
use processor::IpcRequestProcessor;
use redirect::{Dispatch, RedirectFilter};
use rollback::IpcRollback;

use std::fs::File;
use std::io;
use std::process::exit;
use std::str::FromStr;

fn other_error<E: ToString>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

fn parse_id(value: Option<&str>) -> io::Result<u32> {
    match value {
        Some(v) => u32::from_str(v).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e)),
        None => Ok(0),
    }
}

fn init_logging(verbosity: u64, use_syslog: bool) -> io::Result<()> {
    let log_lvl = match verbosity {
        0 => log::Level::Error,
        1 => log::Level::Warn,
        2 => log::Level::Info,
        3 => log::Level::Debug,
        _ => log::Level::Trace,
    };

    #[cfg(unix)]
    {
        if use_syslog {
            let app_name = Some(crate_name!());
            syslog::init(syslog::Facility::LOG_USER, log_lvl.to_level_filter(), app_name)
                .map_err(other_error)?;
            log_panics::init();
            return Ok(());
        }
    }
    #[cfg(not(unix))]
    let _ = use_syslog;

    simple_logger::init_with_level(log_lvl).map_err(other_error)
}

/// Splits `path?query` and prints the dispatch decision
fn print_route(filter: &RedirectFilter, uri: &str) {
    let mut parts = uri.splitn(2, '?');
    let path = parts.next().unwrap_or("");
    match filter.dispatch(path, parts.next()) {
        Dispatch::Forward(target) => println!("forward {}", target),
        Dispatch::PassThrough => println!("pass {}", path),
    }
}

/// Reads command line arguments and calls the corresponding functions.
fn handle_cli_args() -> io::Result<()> {
    #[cfg(unix)]
    let unix_opts = "-s, --syslog      'Logs via syslog'
        ";
    #[cfg(not(unix))]
    let unix_opts = "";

    let usage = &format!(
        "{}-v...             'Repeat to set the level of verbosity'
        -c, --conf <ini>     'The INI configuration file'
        --session [id]       'The session id of all requests'
        --config-id [id]     'The config id of all requests'
        --route [uri]        'Prints where the web API dispatches an URI to and exits'
        [requests]           'The JSON file with the requests to run'",
        unix_opts
    );
    let matches = app_from_crate!().args_from_usage(usage).get_matches();

    init_logging(matches.occurrences_of("v"), matches.is_present("syslog"))?;

    let conf_path = matches.value_of("conf").unwrap_or_default();
    let conf = conf::parse_file(conf_path)?;

    if let Some(uri) = matches.value_of("route") {
        print_route(&RedirectFilter::new(conf.redirect.clone()), uri);
        return Ok(());
    }

    let requests_path = match matches.value_of("requests") {
        Some(p) => p,
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "either a request file or --route is needed",
            ))
        }
    };
    let session_id = parse_id(matches.value_of("session"))?;
    let config_id = parse_id(matches.value_of("config-id"))?;

    info!("Reading requests from {}", requests_path);
    let document: RequestDocument = serde_json::from_reader(File::open(requests_path)?)?;

    let session = TcpClientSession::connect(&conf.connection, &conf.services.logical, 0)?;
    let mut processor = IpcRequestProcessor::new(session, &conf, session_id, config_id);
    let mut rollback = IpcRollback::new(conf.rollback_order);

    match compound::run_compound(&mut processor, &mut rollback, &document.requests) {
        Ok(responses) => {
            println!("{}", serde_json::to_string_pretty(&responses)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", e.error_json().to_json());
            Err(e.into())
        }
    }
}

/// Entry function with top level error handling.
fn main() {
    if let Err(e) = handle_cli_args() {
        error!("{}", e);
        exit(1);
    }
}
