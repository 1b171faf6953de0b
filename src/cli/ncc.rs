// SPDX-License-Identifier: Apache-2.0

mod error;

use std::io::{stdin, Read};

use env_logger::Builder;
use log::LevelFilter;
use netconf::{
    Authenticator, CommitOptions, EditConfigOptions, FilterSpec,
    NetconfOptions, NetconfSession, RpcReply,
};

use crate::error::CliError;

const APP_NAME: &str = "netconfctl";

const SUB_CMD_GET: &str = "get";
const SUB_CMD_APPLY: &str = "apply";
const SUB_CMD_CANCEL_COMMIT: &str = "cancel-commit";
const SUB_CMD_CAPABILITIES: &str = "capabilities";

fn main() {
    let matches = clap::Command::new(APP_NAME)
        .version(clap::crate_version!())
        .about("Command line of the netconf client library")
        .subcommand_required(true)
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Set verbose level")
                .global(true),
        )
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .help("Disable logging")
                .global(true),
        )
        .arg(
            clap::Arg::new("HOST")
                .long("host")
                .takes_value(true)
                .global(true)
                .help("Device to connect to"),
        )
        .arg(
            clap::Arg::new("PORT")
                .long("port")
                .takes_value(true)
                .global(true)
                .help("NETCONF subsystem port, 830 by default"),
        )
        .arg(
            clap::Arg::new("TIMEOUT")
                .long("timeout")
                .takes_value(true)
                .global(true)
                .help("Transport timeout in seconds, 120 by default"),
        )
        .arg(
            clap::Arg::new("USER")
                .short('u')
                .long("user")
                .takes_value(true)
                .global(true)
                .help("SSH user name"),
        )
        .arg(
            clap::Arg::new("PASSWORD")
                .long("password")
                .takes_value(true)
                .global(true)
                .help(
                    "SSH password; the NETCONF_PASSWORD environment \
                    variable is used when omitted",
                ),
        )
        .arg(
            clap::Arg::new("KEY_FILE")
                .short('k')
                .long("key-file")
                .takes_value(true)
                .global(true)
                .help("SSH private key file, used instead of a password"),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_GET)
                .about("Retrieve device configuration")
                .arg(
                    clap::Arg::new("DATASTORE")
                        .short('d')
                        .long("datastore")
                        .takes_value(true)
                        .default_value("running")
                        .help("Datastore to read from"),
                )
                .arg(
                    clap::Arg::new("FILTER_FILE")
                        .short('f')
                        .long("filter")
                        .takes_value(true)
                        .help("YAML subtree filter spec file"),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_APPLY)
                .about(
                    "Lock, edit and commit a configuration fragment \
                    against the candidate datastore",
                )
                .arg(
                    clap::Arg::new("CONFIG_FILE")
                        .required(false)
                        .index(1)
                        .help("XML configuration fragment, '-' for stdin"),
                )
                .arg(
                    clap::Arg::new("DATASTORE")
                        .short('d')
                        .long("datastore")
                        .takes_value(true)
                        .default_value("candidate")
                        .help("Datastore to edit"),
                )
                .arg(
                    clap::Arg::new("NO_LOCK")
                        .long("no-lock")
                        .takes_value(false)
                        .help("Do not lock the datastore before editing"),
                )
                .arg(
                    clap::Arg::new("NO_COMMIT")
                        .long("no-commit")
                        .takes_value(false)
                        .help("Edit only, leave the commit to the caller"),
                )
                .arg(
                    clap::Arg::new("CONFIRM_TIMEOUT")
                        .long("confirm-timeout")
                        .takes_value(true)
                        .help(
                            "Request a confirmed commit rolling back \
                            after this many seconds",
                        ),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_CANCEL_COMMIT)
                .about("Cancel an ongoing confirmed commit")
                .arg(
                    clap::Arg::new("PERSIST_ID")
                        .long("persist-id")
                        .takes_value(true)
                        .help("persist-id of the commit to cancel"),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_CAPABILITIES)
                .about("Show capabilities announced by the device"),
        )
        .get_matches();

    let (log_module_filters, log_level) =
        match matches.occurrences_of("verbose") {
            0 => (vec!["netconf"], LevelFilter::Info),
            1 => (vec!["netconf"], LevelFilter::Debug),
            _ => (vec![""], LevelFilter::Debug),
        };

    if !matches.is_present("quiet") {
        let mut log_builder = Builder::new();
        for log_module_filter in log_module_filters {
            if !log_module_filter.is_empty() {
                log_builder.filter(Some(log_module_filter), log_level);
            } else {
                log_builder.filter(None, log_level);
            }
        }
        log_builder.init();
    }

    if let Some(sub_matches) = matches.subcommand_matches(SUB_CMD_GET) {
        print_result_and_exit(get(&matches, sub_matches));
    } else if let Some(sub_matches) =
        matches.subcommand_matches(SUB_CMD_APPLY)
    {
        print_result_and_exit(apply(&matches, sub_matches));
    } else if let Some(sub_matches) =
        matches.subcommand_matches(SUB_CMD_CANCEL_COMMIT)
    {
        print_result_and_exit(cancel_commit(&matches, sub_matches));
    } else if matches.subcommand_matches(SUB_CMD_CAPABILITIES).is_some() {
        print_result_and_exit(capabilities(&matches));
    }
}

fn print_result_and_exit(result: Result<String, CliError>) {
    match result {
        Ok(s) => {
            println!("{s}");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", e.error_msg);
            std::process::exit(e.code);
        }
    }
}

fn connect(matches: &clap::ArgMatches) -> Result<NetconfSession, CliError> {
    let host = matches
        .value_of("HOST")
        .ok_or("No host defined, please set --host")?;
    let user = matches
        .value_of("USER")
        .ok_or("No user defined, please set --user")?;

    let mut options = NetconfOptions::default();
    if let Some(port) = matches.value_of("PORT") {
        options.port = port
            .parse()
            .map_err(|_| format!("Invalid port: {port}"))?;
    }
    if let Some(timeout) = matches.value_of("TIMEOUT") {
        options.timeout = timeout
            .parse()
            .map_err(|_| format!("Invalid timeout: {timeout}"))?;
    }

    let auth = if let Some(key_file) = matches.value_of("KEY_FILE") {
        Authenticator::private_key_file(
            user,
            std::path::Path::new(key_file),
            None,
        )?
    } else {
        let password = match matches.value_of("PASSWORD") {
            Some(p) => p.to_string(),
            None => std::env::var("NETCONF_PASSWORD").map_err(|_| {
                "No password defined, please set --password or the \
                NETCONF_PASSWORD environment variable"
            })?,
        };
        Authenticator::password(user, &password)?
    };

    Ok(NetconfSession::connect(host, &auth, &options)?)
}

// A reply that is not OK becomes a CliError carrying the rpc-error
// fields, so automation can branch on the exit code.
fn reply_to_string(reply: RpcReply) -> Result<String, CliError> {
    if let Some(body) = reply.reply_body() {
        Ok(body.to_xml()?)
    } else {
        let mut msgs = Vec::new();
        for error in reply.errors() {
            msgs.push(format!(
                "{}: {} {}",
                error.error_severity.as_deref().unwrap_or("error"),
                error.error_tag.as_deref().unwrap_or("unknown"),
                error.error_path.as_deref().unwrap_or(""),
            ));
        }
        Err(CliError::from(msgs.join("\n")))
    }
}

fn get(
    matches: &clap::ArgMatches,
    sub_matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let filter = match sub_matches.value_of("FILTER_FILE") {
        Some(file_path) => {
            let fd = std::fs::File::open(file_path)?;
            Some(serde_yaml::from_reader::<_, FilterSpec>(fd)?)
        }
        None => None,
    };
    let datastore = sub_matches.value_of("DATASTORE").unwrap_or("running");

    let mut session = connect(matches)?;
    let reply = session.get_config(datastore, filter.as_ref())?;
    reply_to_string(reply)
}

fn apply(
    matches: &clap::ArgMatches,
    sub_matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let config = match sub_matches.value_of("CONFIG_FILE") {
        Some("-") | None => {
            let mut content = String::new();
            stdin().read_to_string(&mut content)?;
            content
        }
        Some(file_path) => std::fs::read_to_string(file_path)?,
    };
    let datastore =
        sub_matches.value_of("DATASTORE").unwrap_or("candidate");
    let lock = !sub_matches.is_present("NO_LOCK");

    let mut session = connect(matches)?;
    let reply = session.edit_config(
        &config,
        datastore,
        &EditConfigOptions::default(),
        lock,
    )?;
    if !reply.is_ok() || sub_matches.is_present("NO_COMMIT") {
        return reply_to_string(reply);
    }

    let mut commit_options = CommitOptions::default();
    commit_options.datastore = datastore.to_string();
    commit_options.unlock = lock;
    if let Some(timeout) = sub_matches.value_of("CONFIRM_TIMEOUT") {
        commit_options.confirmed = true;
        commit_options.confirm_timeout = timeout
            .parse()
            .map_err(|_| format!("Invalid confirm timeout: {timeout}"))?;
    }
    reply_to_string(session.commit(&commit_options)?)
}

fn cancel_commit(
    matches: &clap::ArgMatches,
    sub_matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let mut session = connect(matches)?;
    let reply =
        session.cancel_commit(sub_matches.value_of("PERSIST_ID"))?;
    reply_to_string(reply)
}

fn capabilities(matches: &clap::ArgMatches) -> Result<String, CliError> {
    let session = connect(matches)?;
    let mut out = format!("session-id: {}\n", session.session_id());
    for capability in session.remote_capabilities() {
        out.push_str(capability);
        out.push('\n');
    }
    Ok(out.trim_end().to_string())
}
