use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use env_logger::Env;
use serde::Serialize;

use admit_core::report::{model::ToolInfo, render};
use admit_core::result::ResultWire;
use admit_core::verdict::{Enforcement, decode_output, decode_run};
use admit_core::{ExitCode, Host, PolicyResult, inspect, material_digest, run};

mod args;
mod config;
mod harness;
mod policies;

use args::{Command, EvalArgs, OutputFormat};
use config::HarnessConfig;
use harness::Harness;

/// Exit code for failures that produced no trustworthy verdict.
const EXIT_HOST_ERROR: i32 = 2;

/// What `eval` and `verdict` report.
#[derive(Debug, Serialize)]
struct Outcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<String>,
    enforcement: Enforcement,
    /// Set when the policy body failed rather than reporting violations.
    execution_error: bool,
    result: ResultWire,
}

impl Outcome {
    fn new(policy: Option<String>, result: &PolicyResult, execution_error: bool) -> Self {
        Self {
            policy,
            enforcement: Enforcement::of(result),
            execution_error,
            result: result.to_wire(),
        }
    }

    fn exit_code(&self) -> i32 {
        if self.execution_error {
            EXIT_HOST_ERROR
        } else {
            self.enforcement.exit_code()
        }
    }

    fn render(&self, format: OutputFormat, result: &PolicyResult) -> Result<String> {
        Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Text => {
                let mut out = String::new();
                if let Some(policy) = &self.policy {
                    out.push_str(&format!("Policy: {policy}\n"));
                }
                out.push_str(&render::render_verdict_text(result));
                out
            }
        })
    }
}

fn main() {
    let args = args::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let code = match execute(&args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            EXIT_HOST_ERROR
        }
    };

    std::process::exit(code);
}

fn execute(args: &args::Args) -> Result<i32> {
    match &args.command {
        Command::Eval(eval_args) => eval(eval_args, args),
        Command::Verdict { path } => verdict(path, args),
        Command::Inspect { wasm_path } => inspect_module(wasm_path, args),
        Command::Digest { path } => {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            write_output(&format!("{}\n", material_digest(&bytes)), args.out.as_deref())?;
            Ok(0)
        }
        Command::Policies => {
            let mut out = String::new();
            for policy in policies::BUILTINS {
                out.push_str(&format!("{:<22} {}\n", policy.name, policy.summary));
            }
            write_output(&out, args.out.as_deref())?;
            Ok(0)
        }
    }
}

fn eval(eval_args: &EvalArgs, args: &args::Args) -> Result<i32> {
    let policy = policies::find(&eval_args.policy).ok_or_else(|| {
        anyhow!(
            "unknown policy `{}` (available: {})",
            eval_args.policy,
            policies::names().join(", ")
        )
    })?;

    let policy_args = match (&eval_args.args, &eval_args.args_file) {
        (Some(inline), _) => Some(inline.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read args file: {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let config = HarnessConfig::load(eval_args.config.as_deref())?;
    let harness = Harness::new(eval_args.material.clone(), policy_args, config)?;

    log::info!(
        "evaluating {} against {}",
        policy.name,
        eval_args.material.display()
    );
    let status = run(&Host::new(&harness), policy.body);
    log::debug!("policy exited with {}", status.as_i32());

    let result = decode_run(&harness.outputs(), status)
        .with_context(|| format!("policy `{}` broke the result protocol", policy.name))?;

    let outcome = Outcome::new(
        Some(policy.name.to_string()),
        &result,
        status == ExitCode::Failure,
    );
    write_output(&outcome.render(args.format, &result)?, args.out.as_deref())?;
    Ok(outcome.exit_code())
}

fn verdict(path: &Path, args: &args::Args) -> Result<i32> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let result = decode_output(&bytes)
        .with_context(|| format!("{} is not a valid policy result", path.display()))?;

    let outcome = Outcome::new(None, &result, false);
    write_output(&outcome.render(args.format, &result)?, args.out.as_deref())?;
    Ok(outcome.exit_code())
}

fn inspect_module(wasm_path: &Path, args: &args::Args) -> Result<i32> {
    let tool = ToolInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let report = inspect(wasm_path, tool)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => render::render_text(&report),
    };
    write_output(&output, args.out.as_deref())?;

    Ok(report.compatibility.exit_code)
}

fn write_output(output: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}
