// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The rtl-verifier binary's command-line interface.

use std::{fs, process};

use clap::Args;
use codespan_reporting::{
    files::SimpleFile,
    term::{
        self as terminal,
        termcolor::{ColorChoice, StandardStream},
    },
};

use checker::bmc::bmc;
use checker::induction::k_induction;
use checker::properties::Properties;
use rtl::parser::parse_error_diagnostic;
use rtl::transitions::{extract, TransitionSystem};
use solver::backends::CadicalBackend;

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct VerifyArgs {
    #[arg(long)]
    /// Number of frames for the base case; the step adds one more
    bound: Option<usize>,

    #[command(flatten)]
    report: ReportArgs,

    /// File with the transition system and its properties
    file: String,
}

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct BmcArgs {
    #[arg(long, default_value_t = 5)]
    /// Number of frames to unwind
    bound: usize,

    #[command(flatten)]
    report: ReportArgs,

    /// File with the transition system and its properties
    file: String,
}

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct ReportArgs {
    #[arg(long)]
    /// Print the verdicts as JSON
    json: bool,
}

#[derive(clap::Subcommand, Clone, Debug, PartialEq, Eq)]
enum Command {
    /// Prove or refute the properties with k-induction
    Verify(VerifyArgs),
    /// Look for counterexamples within a bounded unwinding
    Bmc(BmcArgs),
}

#[derive(clap::Parser, Debug)]
#[command(about, long_about = None)]
/// Entrypoint for the rtl-verifier binary, including all commands.
pub struct App {
    #[command(subcommand)]
    /// Which command to run
    command: Command,
}

fn load(file: &str) -> (TransitionSystem, Properties) {
    let source = fs::read_to_string(file).unwrap_or_else(|err| {
        eprintln!("could not read input file {file}: {err}");
        process::exit(1);
    });

    let module = match rtl::parser::parse(&source) {
        Ok(module) => module,
        Err(err) => {
            let files = SimpleFile::new(file, &source);
            let writer = StandardStream::stderr(ColorChoice::Auto);
            let config = terminal::Config {
                start_context_lines: 3,
                end_context_lines: 3,
                ..terminal::Config::default()
            };
            terminal::emit(
                &mut writer.lock(),
                &config,
                &files,
                &parse_error_diagnostic((), &err),
            )
            .expect("could not write error");
            process::exit(1);
        }
    };

    match extract(&module) {
        Ok((system, decls)) => (system, Properties::from_decls(&decls)),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

fn report(properties: &Properties, args: &ReportArgs) -> ! {
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&properties.report())
                .expect("could not serialize verdicts"),
        );
    } else {
        for p in &properties.properties {
            println!("[{}] {}", p.name, p.status);
        }
    }

    if properties.properties.iter().any(|p| p.is_refuted()) {
        process::exit(10);
    }
    process::exit(0);
}

impl App {
    /// Run the application.
    pub fn exec(self) {
        match self.command {
            Command::Verify(args) => {
                let (system, properties) = load(&args.file);
                let k = match args.bound {
                    Some(k) => k,
                    None => {
                        log::warn!("no --bound given, using 1-induction");
                        1
                    }
                };
                match k_induction(k, &system, &properties, &CadicalBackend::new) {
                    Ok(properties) => report(&properties, &args.report),
                    Err(err) => {
                        eprintln!("{err}");
                        process::exit(2);
                    }
                }
            }
            Command::Bmc(args) => {
                let (system, mut properties) = load(&args.file);
                match bmc(args.bound, &system, &mut properties, &CadicalBackend::new) {
                    Ok(()) => report(&properties, &args.report),
                    Err(err) => {
                        eprintln!("{err}");
                        process::exit(2);
                    }
                }
            }
        }
    }
}
