use std::env;
use std::process;

use sessionfs::ClientConfig;

pub fn usage_and_exit(usage: &str) -> ! {
    eprintln!("{usage}");
    process::exit(1);
}

pub struct ArgParser {
    args: Vec<String>,
    usage: &'static str,
}

impl ArgParser {
    pub fn new(usage: &'static str) -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{usage}");
            process::exit(0);
        }

        Self { args, usage }
    }

    pub fn take_value(&mut self, names: &[&str]) -> Option<String> {
        let mut i = 0;
        while i < self.args.len() {
            if names.contains(&self.args[i].as_str()) {
                let value = self.args.get(i + 1).cloned();
                if value.is_none() {
                    usage_and_exit(self.usage);
                }
                self.args.drain(i..=i + 1);
                return value;
            }
            i += 1;
        }
        None
    }

    pub fn remaining(self) -> Vec<String> {
        self.args
    }
}

/// Build a client config: `--config FILE` or the environment, then flag overrides.
pub fn config_from_parser(parser: &mut ArgParser, usage: &'static str) -> ClientConfig {
    let base = match parser.take_value(&["--config", "-c"]) {
        Some(path) => ClientConfig::load(&path),
        None => ClientConfig::from_env(),
    };
    let mut config = base.unwrap_or_else(|e| {
        eprintln!("{e}");
        usage_and_exit(usage)
    });

    if let Some(server) = parser.take_value(&["--server", "-s"]) {
        config.server = server;
    }
    if let Some(token) = parser.take_value(&["--token", "-t"]) {
        config = config.with_token(token);
    }
    if let Some(proxy) = parser.take_value(&["--proxy"]) {
        config = config.with_proxy(proxy);
    }
    config
}
