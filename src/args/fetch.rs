use super::{config_arg, verbosity_arg};
use clap::{App, Arg, ArgMatches, SubCommand};

pub const COMMAND_NAME: &str = "fetch";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Download the keytab of the configuration into the local cache")
        .arg(config_arg())
        .arg(
            Arg::with_name("krb5")
                .long("krb5")
                .help("Also fetch the krb5 file of the configuration"),
        )
        .arg(verbosity_arg())
}

#[derive(Debug)]
pub struct Arguments {
    pub config: String,
    pub krb5: bool,
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
            krb5: self.matches.is_present("krb5"),
            verbosity: self.matches.occurrences_of("verbosity") as usize,
        };
    }
}
