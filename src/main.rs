use clap::Parser;
use ember::{Ember, cli::*};

fn main() {
	let ember = Ember;

	match Cli::parse().mode {
		Mode::Run { path } => match ember.run_file(&path) {
			Ok(code) => std::process::exit(code),
			Err(e) => {
				eprintln!("Failed run file: {e}");
				std::process::exit(1);
			}
		},
		Mode::Translate { path } => {
			if let Err(e) = ember.translate_file(&path) {
				eprintln!("Failed translate file: {e}");
				std::process::exit(1);
			}
		}
	}
}
