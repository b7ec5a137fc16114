mod format;

use {
    base::*,
    format::*,
    history::{FileStore, HistoryStore},
    inference::OnnxBackend,
    pipeline::{Capture, ChannelDelivery, Coordinator, Delivery, PipelineConfig},
    std::{
        path::PathBuf,
        sync::{Arc, Weak},
    },
};

enum Command {
    Classify(PathBuf),
    History,
    Clear,
}

fn parse_args(args: &[String]) -> Option<(Option<PathBuf>, Command)> {
    let mut config = None;
    let mut rest = args;
    if let [flag, path, tail @ ..] = rest {
        if flag == "--config" {
            config = Some(PathBuf::from(path));
            rest = tail;
        }
    }
    let command = match rest {
        [command, image] if command == "classify" => Command::Classify(PathBuf::from(image)),
        [command] if command == "history" => Command::History,
        [command] if command == "clear" => Command::Clear,
        _ => return None,
    };
    Some((config, command))
}

/// Parse a full argv, program name first. An empty argv is a usage error.
fn parse_argv(argv: &[String]) -> Option<(Option<PathBuf>, Command)> {
    parse_args(argv.get(1..).unwrap_or_default())
}

fn open_history(config: &PipelineConfig) -> Result<HistoryStore, Box<dyn std::error::Error>> {
    let storage = FileStore::new(&config.history_dir, &config.history_namespace)?;
    Ok(HistoryStore::new(Box::new(storage), config.history_key.clone()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let Some((config_path, command)) = parse_argv(&args) else {
        let program = args.first().map(String::as_str).unwrap_or("dermoscan");
        eprintln!("Usage: {program} [--config <file>] <classify <image> | history | clear>");
        std::process::exit(1);
    };

    let config = match config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    match &config.log_dir {
        Some(dir) => base::init_file_logger(dir)?,
        None => base::init_stdout_logger(),
    }
    base::set_max_level(config.level()?);

    match command {
        Command::Classify(path) => {
            let coordinator = Coordinator::start(&config, Arc::new(OnnxBackend::new()))?;
            if let Some(error) = coordinator.load_error() {
                log_fatal!("cannot classify without a model: {}", error);
            }
            let capture = Capture::from_file(&path)?;
            let (delivery, mut outcomes) = ChannelDelivery::new();
            let target: Weak<dyn Delivery> = Arc::downgrade(&delivery) as Weak<dyn Delivery>;
            coordinator.submit(capture, target)?.await?;

            match outcomes.recv().await {
                Some(Ok(classification)) => {
                    let result = &classification.result;
                    println!("{}", result.label);
                    println!("{} ({})", format_confidence(result.confidence), result.level());
                    for line in format_ranking(&classification.ranking) {
                        println!("{line}");
                    }
                }
                Some(Err(error)) => return Err(error.into()),
                None => return Err("classification produced no outcome".into()),
            }
        }
        Command::History => {
            let entries = open_history(&config)?.load();
            if entries.is_empty() {
                println!("No analysis history yet");
            }
            for entry in &entries {
                println!("{}", format_entry(entry));
            }
        }
        Command::Clear => {
            open_history(&config)?.clear()?;
            log_info!("history cleared");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert!(matches!(
            parse_args(&args(&["classify", "a.jpg"])),
            Some((None, Command::Classify(_)))
        ));
        assert!(matches!(
            parse_args(&args(&["--config", "c.json", "history"])),
            Some((Some(_), Command::History))
        ));
        assert!(matches!(parse_args(&args(&["clear"])), Some((None, Command::Clear))));
        assert!(parse_args(&args(&["classify"])).is_none());
        assert!(parse_args(&args(&["--config", "c.json"])).is_none());
        assert!(parse_args(&args(&[])).is_none());
    }

    #[test]
    fn test_parse_argv_without_program_name() {
        assert!(parse_argv(&[]).is_none());
        assert!(parse_argv(&args(&["dermoscan"])).is_none());
        assert!(matches!(
            parse_argv(&args(&["dermoscan", "history"])),
            Some((None, Command::History))
        ));
    }
}
