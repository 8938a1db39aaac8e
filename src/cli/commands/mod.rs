pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_HASH_PASSWORD: &str = "hash-password";
pub const ARG_COST: &str = "cost";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("menuboard")
        .about("Restaurant menu admin")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_negates_reqs(true)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("MENUBOARD_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .subcommand(
            Command::new(CMD_HASH_PASSWORD)
                .about("Read a password from stdin and print its bcrypt hash")
                .arg(
                    Arg::new(ARG_COST)
                        .long(ARG_COST)
                        .help("bcrypt cost factor")
                        .default_value("10")
                        .value_parser(clap::value_parser!(u32).range(4..=31)),
                ),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}
