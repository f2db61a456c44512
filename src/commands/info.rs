use crate::error::Result;
use crate::output::Format;
use crate::session::SessionGate;
use crate::store::RecordStore;
use crate::store::data_dir::DataDir;

pub fn run(data: &DataDir, store: &RecordStore, format: Format) -> Result<()> {
    let session = SessionGate::new(&data.session_path()).current();
    match format {
        Format::Json => println!(
            "{}",
            serde_json::json!({
                "root": data.root().display().to_string(),
                "backend": data.config().backend.to_string(),
                "store": store.describe(),
                "audit_cap": store.audit_cap(),
                "version": env!("CARGO_PKG_VERSION"),
                "signed_in": session.as_ref().map(|s| s.user.as_str()),
            })
        ),
        _ => {
            println!("root:      {}", data.root().display());
            println!("store:     {}", store.describe());
            println!("audit cap: {}", store.audit_cap());
            println!("version:   {}", env!("CARGO_PKG_VERSION"));
            match session {
                Some(s) => println!("session:   {} since {}", s.user, s.at.to_rfc3339()),
                None => println!("session:   none"),
            }
        }
    }
    Ok(())
}
