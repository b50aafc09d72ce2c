use super::{config_arg, validators, verbosity_arg};
use clap::{App, Arg, ArgMatches, SubCommand};

pub const COMMAND_NAME: &str = "proxy";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Login as the server principal and act on behalf of a user")
        .arg(config_arg())
        .arg(
            Arg::with_name("user")
                .long("user")
                .short("u")
                .takes_value(true)
                .help("User to act on behalf of")
                .required(true),
        )
        .arg(
            Arg::with_name("keytab")
                .long("keytab")
                .short("k")
                .takes_value(true)
                .value_name("file")
                .help("Keytab of the server principal. Resolved from the configuration if not provided")
                .validator(validators::is_file),
        )
        .arg(
            Arg::with_name("cred-file")
                .long("cred-file")
                .takes_value(true)
                .value_name("file")
                .help("File to save the S4U2Self ticket of the user"),
        )
        .arg(verbosity_arg())
}

#[derive(Debug)]
pub struct Arguments {
    pub config: String,
    pub proxy_user: String,
    pub keytab: Option<String>,
    pub out_file: Option<String>,
    pub verbosity: usize,
}

pub struct ArgumentsParser<'a> {
    matches: &'a ArgMatches<'a>,
}

impl<'a> ArgumentsParser<'a> {
    pub fn parse(matches: &'a ArgMatches) -> Arguments {
        let parser = Self { matches: matches };
        return parser._parse();
    }

    fn _parse(&self) -> Arguments {
        return Arguments {
            config: self.matches.value_of("config").unwrap().into(),
            proxy_user: self.matches.value_of("user").unwrap().into(),
            keytab: self.matches.value_of("keytab").map(|s| s.into()),
            out_file: self.matches.value_of("cred-file").map(|s| s.into()),
            verbosity: self.matches.occurrences_of("verbosity") as usize,
        };
    }
}
