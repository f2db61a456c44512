use crate::admin;
use crate::error::Result;
use crate::output::Format;
use crate::session::SessionGate;
use crate::store::RecordStore;

pub fn login(
    store: &mut RecordStore,
    gate: &SessionGate,
    username: &str,
    password: &str,
    format: Format,
) -> Result<()> {
    let session = admin::sign_in(store, username, password)?;
    gate.begin(&session)?;
    match format {
        Format::Json => println!("{}", serde_json::to_string(&session)?),
        _ => eprintln!("Admin authenticated as {}", session.user),
    }
    Ok(())
}

pub fn logout(gate: &SessionGate) -> Result<()> {
    if gate.end()? {
        eprintln!("Signed out");
    } else {
        eprintln!("No active session");
    }
    Ok(())
}

pub fn passwd(store: &mut RecordStore, password: &str) -> Result<()> {
    admin::rotate_admin_password(store, password)?;
    eprintln!("Admin password updated");
    Ok(())
}

pub fn reset(store: &mut RecordStore) -> Result<()> {
    admin::reset_admin(store);
    eprintln!("Admin reset to demo credentials");
    Ok(())
}
