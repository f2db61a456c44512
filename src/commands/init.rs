use std::path::Path;

use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::store::data_dir::DataDir;

pub fn run(root: &Path, backend: BackendKind, audit_cap: Option<usize>) -> Result<()> {
    let mut config = Config {
        backend,
        ..Config::default()
    };
    config.audit_cap = config.effective_audit_cap(audit_cap);
    let data = DataDir::init(root, config)?;
    eprintln!(
        "Initialized {} store in {}",
        data.config().backend,
        data.root().display()
    );
    Ok(())
}
