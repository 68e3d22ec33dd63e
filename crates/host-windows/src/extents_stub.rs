use anyhow::{anyhow, Result};

pub fn disk_number_for_drive(_drive_letter: char) -> Result<Option<u32>> {
    Err(anyhow!("volume extent query requires Windows"))
}
