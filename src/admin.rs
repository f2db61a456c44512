use tracing::info;

use crate::error::{JuneError, Result};
use crate::model::AdminCredential;
use crate::secret;
use crate::session::AdminSession;
use crate::store::RecordStore;

/// Compare credentials against the stored admin record. Both outcomes are audited.
pub fn sign_in(store: &mut RecordStore, username: &str, password: &str) -> Result<AdminSession> {
    let admin = store.admin();
    let username = username.trim();
    let ok = !admin.username.is_empty()
        && username == admin.username
        && secret::matches(&admin.pass_hash, password);
    if !ok {
        store.append_audit("admin:signin-failed", username);
        return Err(JuneError::InvalidCredentials);
    }
    store.append_audit("admin:signin", &admin.username);
    info!(user = %admin.username, "admin signed in");
    Ok(AdminSession::new(&admin.username))
}

pub fn rotate_admin_password(store: &mut RecordStore, new_password: &str) -> Result<()> {
    let new_password = new_password.trim();
    if new_password.is_empty() {
        return Err(JuneError::validation("Enter a new password"));
    }
    let mut admin = store.admin();
    admin.pass_hash = secret::obfuscate(new_password);
    store.put_admin(&admin);
    store.append_audit("admin:passwd", "rotated");
    Ok(())
}

/// Restore the demo credential.
pub fn reset_admin(store: &mut RecordStore) {
    store.put_admin(&AdminCredential::demo());
    store.append_audit("admin:reset", "defaults restored");
}
