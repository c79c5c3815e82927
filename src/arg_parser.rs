use std::path::PathBuf;

use argparse::{ArgumentParser, Print, Store, StoreOption, StoreTrue};

pub struct ArgsOptions {
    pub config_file_path: PathBuf,
    pub debug: bool,

    // Name of a single MCU request to send instead of running the daemon
    pub send: Option<String>,

    // Print the effective configuration as Json and exit
    pub print_config: bool,
}

impl ArgsOptions {
    pub fn parse() -> Self {
        let mut options = ArgsOptions::default();

        {
            let mut parser = ArgumentParser::new();
            parser.set_description("System daemon for the D-Link DNS-320L enclosure MCU");

            // Configuration file path
            parser.refer(&mut options.config_file_path).add_option(
                &["-c", "--config"],
                Store,
                "The file path of the configuration file",
            );

            parser.refer(&mut options.debug).add_option(
                &["-d", "--debug"],
                StoreTrue,
                "Enable debug logging",
            );

            parser.refer(&mut options.send).add_option(
                &["-s", "--send"],
                StoreOption,
                "Send a single request to the MCU and exit \
                 (e.g. temperature, power-led-blink, wol-status)",
            );

            parser.refer(&mut options.print_config).add_option(
                &["-p", "--print-config"],
                StoreTrue,
                "Print the effective configuration and exit",
            );

            // Show daemon version
            parser.add_option(
                &["-V", "--version"],
                Print(env!("CARGO_PKG_VERSION").to_string()),
                "Show the daemon version"
            );

            parser.parse_args_or_exit();
        }

        options
    }
}

impl Default for ArgsOptions {
    fn default() -> Self {
        Self {
            config_file_path: PathBuf::from("/etc/dns320ld.json"),
            debug: false,
            send: None,
            print_config: false,
        }
    }
}
