use cinedex::app::storage::{KeyValueStore, SqliteStore, StorageError};
use cinedex::config::local_db_path;
use std::env;
use std::fs;

#[derive(Debug, Default, PartialEq)]
struct Args {
    key: Option<String>,
    delete: Option<String>,
    out_file: Option<String>,
}

fn parse_args(args: &[String]) -> Args {
    let value_after = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1).cloned())
    };
    Args {
        key: args.get(1).filter(|a| !a.starts_with("--")).cloned(),
        delete: value_after("--delete"),
        out_file: value_after("--out"),
    }
}

/// Pretty-print stored JSON; anything unparseable is shown as-is.
fn pretty(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| raw.to_string())
}

/// Remove one key; returns whether it was there.
fn delete_key(store: &mut impl KeyValueStore, key: &str) -> Result<bool, StorageError> {
    let existed = store.get(key).is_some();
    store.remove(key)?;
    Ok(existed)
}

fn main() -> Result<(), StorageError> {
    let raw_args: Vec<String> = env::args().collect();

    if raw_args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: cargo run --bin kv_explorer [key] [--delete key] [--out file]");
        std::process::exit(1);
    }
    let args = parse_args(&raw_args);

    let db_path = local_db_path();
    println!("Opening cache DB: {}", db_path.display());
    let mut store = SqliteStore::open(&db_path)?;

    if let Some(key) = &args.delete {
        if delete_key(&mut store, key)? {
            println!("Deleted {key:?}");
        } else {
            println!("(no value stored under {key:?})");
        }
        return Ok(());
    }

    let mut output = String::new();
    match args.key.as_deref() {
        Some(key) => match store.get(key) {
            Some(raw) => {
                output.push_str(&format!("--- Key: {key} ---\n"));
                output.push_str(&pretty(&raw));
                output.push('\n');
            }
            None => output.push_str(&format!("(no value stored under {key:?})\n")),
        },
        None => {
            let keys = store.keys()?;
            output.push_str(&format!("--- {} keys ---\n", keys.len()));
            for k in keys {
                let len = store.get(&k).map(|v| v.len()).unwrap_or(0);
                output.push_str(&format!("{k:<20} {len:>10} bytes\n"));
            }
        }
    }

    if let Some(path) = args.out_file {
        if let Err(e) = fs::write(&path, output.as_bytes()) {
            eprintln!("Failed to write {path}: {e}");
            std::process::exit(1);
        }
        println!("Exported results to {path}");
    } else {
        print!("{output}");
    }

    Ok(())
}
