use std::path::Path;

pub fn is_file(v: String) -> Result<(), String> {
    if !Path::new(&v).is_file() {
        return Err(format!("File '{}' not found", v));
    }
    return Ok(());
}

pub fn is_kdc_address(v: String) -> Result<(), String> {
    syncauth::communication::parse_kdc_address(&v)
        .map_err(|err| format!("Invalid KDC address '{}': {}", v, err))?;
    return Ok(());
}
