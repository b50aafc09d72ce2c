use super::{config_arg, verbosity_arg};
use clap::{App, ArgMatches, SubCommand};

pub const COMMAND_NAME: &str = "principal";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Show the principal used to login")
        .arg(config_arg())
        .arg(verbosity_arg())
}

#[derive(Debug)]
pub struct Arguments {
    pub config: String,
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
            verbosity: self.matches.occurrences_of("verbosity") as usize,
        };
    }
}
