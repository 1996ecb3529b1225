use anyhow::Result;

pub const ENTRY_FILE_NAME: &str = "index.bundle";

pub const MAX_ENTRY_SEARCH_DEPTH: usize = 8;

pub fn validate_bundle_id(bundle_id: &str) -> Result<()> {
    if bundle_id.is_empty() || bundle_id.len() > 128 {
        anyhow::bail!("invalid bundle id: must be 1-128 characters");
    }

    let mut chars = bundle_id.chars();
    let Some(first) = chars.next() else {
        anyhow::bail!("invalid bundle id: '{bundle_id}'");
    };

    let first_is_valid = first.is_ascii_alphanumeric();
    let rest_is_valid = chars
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.');
    if !first_is_valid || !rest_is_valid {
        anyhow::bail!("invalid bundle id: '{bundle_id}'");
    }

    Ok(())
}
