//! Answersync CLI - Command-line interface
//!
//! Commands:
//!   parse      - Recover a model from a class file
//!   generate   - Generate class source from a model file
//!   roundtrip  - Check parse/generate stability of a class file
//!   validate   - Report issues for a class file
//!   schema     - Print the JSON schema of the model

use answersync::*;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "parse" => cmd_parse(&args[2..]),
        "generate" => cmd_generate(&args[2..]),
        "roundtrip" => cmd_roundtrip(&args[2..]),
        "validate" => cmd_validate(&args[2..]),
        "schema" => cmd_schema(),
        "version" | "--version" | "-v" => {
            println!("answersync {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
Answersync - answer-schema / source synchronization

USAGE:
    answersync <COMMAND> [OPTIONS]

COMMANDS:
    parse <class.py> [--json]        Recover the model from a class file
                                      (YAML by default, JSON with --json)
    generate <model.yaml|json>       Generate class source from a model file
    roundtrip <class.py>             Parse, regenerate, reparse; report stability
    validate <class.py> [--json]     Report naming/type issues for a class file
    schema                           Print JSON schema for the model type
    version                          Print version

EXAMPLES:
    answersync parse answer.py
    answersync generate answer.yaml > answer.py
    answersync roundtrip answer.py
    answersync validate answer.py --json
"#
    );
}

fn cmd_parse(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .ok_or("Usage: answersync parse <class.py> [--json]")?;
    let json_output = args.contains(&"--json".to_string());

    let source = fs::read_to_string(path)?;
    let model = parse(&source)?;

    if json_output {
        println!("{}", model.to_json()?);
    } else {
        println!("{}", model.to_yaml()?);
    }
    Ok(())
}

fn cmd_generate(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .ok_or("Usage: answersync generate <model.yaml|json>")?;

    let content = fs::read_to_string(path)?;
    let model = if path.ends_with(".json") {
        ClassDefinition::from_json(&content)?
    } else {
        ClassDefinition::from_yaml(&content)?
    };

    print!("{}", generate(&model));
    Ok(())
}

fn cmd_roundtrip(args: &[String]) -> Result<()> {
    let path = args.first().ok_or("Usage: answersync roundtrip <class.py>")?;

    let source = fs::read_to_string(path)?;
    let model = parse(&source)?;
    let regenerated = generate(&model);
    let reparsed = parse(&regenerated)?;

    if reparsed != model {
        return Err("Round-trip mismatch: reparsed model differs".into());
    }
    if generate(&reparsed) != regenerated {
        return Err("Round-trip mismatch: regenerated text is not stable".into());
    }

    println!(
        "✓ {} round-trips ({} fields, hash {})",
        model.name,
        model.fields.len(),
        model.hash()
    );
    Ok(())
}

fn cmd_validate(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .ok_or("Usage: answersync validate <class.py> [--json]")?;
    let json_output = args.contains(&"--json".to_string());

    let source = fs::read_to_string(path)?;
    let model = parse(&source)?;
    let report = validate_class(&model);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.issues.is_empty() {
        println!("✓ No issues");
    } else {
        for issue in &report.issues {
            let severity = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Suggestion => "suggestion",
            };
            match &issue.field {
                Some(field) => {
                    println!("{} [{}] {}: {}", severity, issue.code, field, issue.message)
                }
                None => println!("{} [{}] {}", severity, issue.code, issue.message),
            }
        }
        println!(
            "{} error(s), {} warning(s)",
            report.error_count(),
            report.warning_count()
        );
    }

    if report.has_errors() {
        return Err("Validation errors found".into());
    }
    Ok(())
}

fn cmd_schema() -> Result<()> {
    let schema = schemars::schema_for!(ClassDefinition);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
