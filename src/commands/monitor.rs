use crate::error::Result;
use crate::output::Format;
use crate::roster;
use crate::store::RecordStore;

pub fn ping(store: &mut RecordStore, id: &str, format: Format) -> Result<()> {
    roster::ping(store, id)?;
    let id = roster::normalize_id(id);
    match format {
        Format::Json => println!("{}", serde_json::json!({ "pinged": id })),
        _ => eprintln!("Pinged {id}"),
    }
    Ok(())
}
