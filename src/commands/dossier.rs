use std::path::Path;

use chrono::Local;

use crate::dossier;
use crate::error::Result;
use crate::model::Agent;
use crate::output::Format;
use crate::store::RecordStore;

fn print_dossier(agent: &Agent, position: Option<(usize, usize)>, format: Format) -> Result<()> {
    let report = dossier::report(agent);
    match format {
        Format::Json => println!(
            "{}",
            serde_json::json!({
                "id": agent.identity(),
                "position": position.map(|(i, _)| i),
                "total": position.map(|(_, n)| n),
                "report": report,
            })
        ),
        _ => {
            if let Some((i, n)) = position {
                eprintln!("[{}/{}] Loaded: {}", i + 1, n, Local::now().format("%Y-%m-%d %H:%M:%S"));
            }
            println!("{report}");
        }
    }
    Ok(())
}

fn roster_len(store: &RecordStore) -> usize {
    store.get::<Agent>().len()
}

pub fn show(store: &RecordStore, format: Format) -> Result<()> {
    match dossier::current(store) {
        Some((idx, agent)) => print_dossier(&agent, Some((idx, roster_len(store))), format),
        None => {
            eprintln!("No agents on the roster");
            Ok(())
        }
    }
}

pub fn select(store: &mut RecordStore, id: &str, format: Format) -> Result<()> {
    dossier::select(store, id)?;
    show(store, format)
}

pub fn step(store: &mut RecordStore, delta: isize, format: Format) -> Result<()> {
    dossier::step(store, delta);
    show(store, format)
}

pub fn clear(store: &mut RecordStore) -> Result<()> {
    dossier::clear_selection(store);
    eprintln!("Selection cleared");
    Ok(())
}

pub fn export(store: &RecordStore, out_dir: &Path, format: Format) -> Result<()> {
    let Some((_, agent)) = dossier::current(store) else {
        eprintln!("No agents on the roster");
        return Ok(());
    };
    let path = dossier::export_report(&agent, out_dir)?;
    match format {
        Format::Json => println!(
            "{}",
            serde_json::json!({ "id": agent.identity(), "path": path.display().to_string() })
        ),
        _ => eprintln!("Wrote {}", path.display()),
    }
    Ok(())
}
