use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("prospect")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("prospect")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the prospect configuration directory")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location for the prospect configuration directory")
                        .default_value("~/.config/prospect/"),
                )
                .arg(
                    arg!(-f - -"force")
                        .help("Forces the overwriting of any existing configuration assets.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("scrape")
                .about(
                    "Scrape publicly discoverable profiles for an industry filter into a \
                SQLite row store and a CSV export.",
                )
                .arg(
                    arg!(-i --"industry" <INDUSTRY>)
                        .required(true)
                        .help("Industry filter, e.g. 'Information Technology'"),
                )
                .arg(
                    arg!(-m --"max-profiles" <COUNT>)
                        .required(false)
                        .help("Maximum number of profiles to scrape")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(-c --"concurrency" <WORKERS>)
                        .required(false)
                        .help("Number of concurrent extraction workers")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(--"proxy" <URL>)
                        .required(false)
                        .help("Proxy URL (socks5/http)"),
                )
                .arg(
                    arg!(--"login-cookie" <COOKIE>)
                        .required(false)
                        .help("Raw cookie header for an authenticated session"),
                )
                .arg(
                    arg!(--"resume" "Skip profiles already present in the row store")
                        .required(false),
                )
                .arg(
                    arg!(--"headless" <BOOL>)
                        .required(false)
                        .help("Run the browser headless")
                        .value_parser(clap::value_parser!(bool))
                        .default_value("true"),
                )
                .arg(
                    arg!(-o --"outdir" <PATH>)
                        .required(false)
                        .help("Directory for profiles.db and profiles.csv")
                        .default_value("./output"),
                ),
        )
}
