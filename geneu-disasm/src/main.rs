//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{
	fs,
	io::{self, Read, Write},
	path::{Path, PathBuf},
	process::exit,
};

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use geneu_isa::{Generation, Program};
use log::{info, warn, LevelFilter};

/// Disassembles Intel Gen4 through Gen9 EU instructions.
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Instructions to disassemble; `-` reads standard input.
	input: PathBuf,

	/// Where to write the disassembly; `-` (the default) is standard output.
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Read the input as a C-style byte array instead of words.
	#[arg(short, long, conflicts_with = "raw")]
	binary: bool,

	/// Read the input as raw little-endian instructions.
	#[arg(short, long)]
	raw: bool,

	/// Hardware generation the instructions were encoded for.
	#[arg(short, long = "gen", default_value_t = 4, value_parser = clap::value_parser!(u32).range(4..=9))]
	generation: u32,

	/// Log more; repeat for even more.
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn is_stdio(path: &Path) -> bool {
	path == Path::new("-")
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
	let mut buffer = Vec::new();
	if is_stdio(path) {
		io::stdin()
			.lock()
			.read_to_end(&mut buffer)
			.context("Failed to read standard input")?;
	} else {
		buffer = fs::read(path).with_context(|| format!("Failed to read \"{}\"", path.display()))?;
	}
	Ok(buffer)
}

fn load(args: &Args, input: &[u8]) -> Result<Program> {
	if args.raw {
		return Ok(Program::from_binary(input));
	}

	let text = std::str::from_utf8(input).with_context(|| {
		format!(
			"\"{}\" is not text; pass --raw for binary input",
			args.input.display()
		)
	})?;

	let program = if args.binary {
		Program::parse_bytes(text)
	} else {
		Program::parse_words(text)
	};
	program.with_context(|| format!("Failed to parse \"{}\"", args.input.display()))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
	match path {
		Some(path) if !is_stdio(path) => {
			fs::write(path, text).with_context(|| format!("Failed to write \"{}\"", path.display()))
		},
		_ => {
			let mut stdout = io::stdout().lock();
			stdout
				.write_all(text.as_bytes())
				.and_then(|_| stdout.flush())
				.context("Failed to write standard output")
		},
	}
}

fn run(args: &Args) -> Result<()> {
	let gen = Generation::try_from(args.generation)
		.with_context(|| format!("There is no Gen{}", args.generation))?;

	let input = read_input(&args.input)?;
	let program = load(args, &input)?;
	if program.is_empty() {
		bail!("No instructions in \"{}\"", args.input.display());
	}
	info!("Disassembling {} {} instruction(s)", program.len(), gen);

	let output = program.disassemble(gen);
	if !output.is_clean() {
		warn!("{} invalid field value(s)", output.errors);
	}

	write_output(args.output.as_deref(), &output.text)
}

fn main() {
	let cli = match Args::try_parse() {
		Ok(x) => x,
		Err(e) => {
			// help and version requests aren't failures
			if !e.use_stderr() {
				e.exit();
			}
			eprint!("{}", e);
			exit(1);
		},
	};

	let level = match cli.verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};
	env_logger::Builder::new()
		.filter_level(level)
		.parse_default_env()
		.init();

	if let Err(e) = run(&cli) {
		eprintln!("{:#}", e);
		exit(1);
	}
}
