use std::time::{Duration, Instant};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quiescent::{
    DebounceOptions, DebouncePolicy, Debounced, QueryCriteria, QuiescentError, Record,
    RecordStore, TokioTimer,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "quiescent-demo",
    about = "Type to feed a debounced logger; add/search records in memory"
)]
struct Args {
    /// Quiet period before a typed line is logged.
    #[arg(long, default_value_t = 1000)]
    wait_ms: i64,

    /// Log at most this long after the first line of a burst.
    #[arg(long)]
    max_wait_ms: Option<i64>,

    /// Log the first line of a burst immediately.
    #[arg(long, default_value_t = false)]
    leading: bool,

    /// Do not log the last line of a burst.
    #[arg(long, default_value_t = false)]
    no_trailing: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Add(Record),
    Search(QueryCriteria),
    Force(String),
    Flush,
    Cancel,
    Quit,
    Input(String),
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "add" => {
            let (id, tags) = rest.split_once(' ').unwrap_or((rest, ""));
            if id.is_empty() {
                return Err("ID cannot be empty".to_string());
            }
            Ok(Command::Add(Record {
                id: id.to_string(),
                tags: parse_tags(tags),
            }))
        }
        "search" => {
            let mut criteria = QueryCriteria::default();
            for part in rest.split_whitespace() {
                if let Some(id) = part.strip_prefix("id=") {
                    criteria.id = Some(id.to_string()).filter(|id| !id.is_empty());
                } else if let Some(tags) = part.strip_prefix("tags=") {
                    criteria.tags = parse_tags(tags);
                } else {
                    return Err(format!("unknown search filter: {part}"));
                }
            }
            Ok(Command::Search(criteria))
        }
        "force" => Ok(Command::Force(rest.to_string())),
        "flush" => Ok(Command::Flush),
        "cancel" => Ok(Command::Cancel),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Ok(Command::Input(line.to_string())),
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), QuiescentError> {
    init_logging();
    let args = Args::parse();

    let policy = DebouncePolicy::try_from(DebounceOptions {
        wait_ms: args.wait_ms,
        leading: Some(args.leading),
        trailing: Some(!args.no_trailing),
        max_wait_ms: args.max_wait_ms,
    })?;

    let started = Instant::now();
    let logger = Debounced::new(
        move |value: String| {
            let elapsed: Duration = started.elapsed();
            tracing::info!(elapsed_ms = elapsed.as_millis() as u64, %value, "debounced input");
        },
        policy,
        TokioTimer::current(),
    )?;

    let store = RecordStore::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    tracing::info!(?policy, "ready; type text, or add/search/force/flush/cancel/quit");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::error!(error = ?err, "failed to read stdin");
                break;
            }
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };

        match command {
            Command::Add(record) => match store.add(record) {
                Ok(()) => tracing::info!(size = store.size(), "record added"),
                Err(err) => tracing::warn!(error = %err, "record rejected"),
            },
            Command::Search(criteria) => {
                let results = store.query(Some(&criteria));
                if results.is_empty() {
                    tracing::info!("no results found");
                }
                for record in results {
                    tracing::info!(id = %record.id, tags = ?record.tags, "match");
                }
            }
            Command::Force(value) => {
                logger.force_next();
                logger.call(value);
            }
            Command::Flush => {
                if logger.flush().is_none() {
                    tracing::info!("nothing pending");
                }
            }
            Command::Cancel => logger.cancel(),
            Command::Quit => break,
            Command::Input(value) => {
                logger.call(value);
            }
        }
    }

    logger.flush();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_trimmed_tags() {
        assert_eq!(
            parse_command("add 42 red, big ,,blue").unwrap(),
            Command::Add(Record::new("42", ["red", "big", "blue"]))
        );
        assert_eq!(
            parse_command("add 7").unwrap(),
            Command::Add(Record::new("7", Vec::<String>::new()))
        );
    }

    #[test]
    fn add_without_id_is_rejected() {
        assert!(parse_command("add").is_err());
    }

    #[test]
    fn parses_search_filters() {
        assert_eq!(
            parse_command("search id=42 tags=a,b").unwrap(),
            Command::Search(QueryCriteria {
                id: Some("42".to_string()),
                tags: vec!["a".to_string(), "b".to_string()],
            })
        );
        assert_eq!(
            parse_command("search").unwrap(),
            Command::Search(QueryCriteria::default())
        );
        assert!(parse_command("search colour=red").is_err());
    }

    #[test]
    fn anything_else_is_input() {
        assert_eq!(
            parse_command("hello world").unwrap(),
            Command::Input("hello world".to_string())
        );
        assert_eq!(parse_command("force now").unwrap(), Command::Force("now".to_string()));
        assert_eq!(parse_command("flush").unwrap(), Command::Flush);
    }
}
