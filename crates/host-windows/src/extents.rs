use anyhow::{anyhow, Result};
use std::ffi::c_void;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Ioctl::{IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS, VOLUME_DISK_EXTENTS};
use windows::Win32::System::IO::DeviceIoControl;

struct VolumeHandle(HANDLE);

impl Drop for VolumeHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn wide(s: &str) -> Vec<u16> {
    use std::os::windows::prelude::*;
    std::ffi::OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

fn open_volume_handle(drive_letter: char) -> Result<VolumeHandle> {
    let path = format!(r"\\.\{}:", drive_letter);
    let w = wide(&path);

    // Extent queries need no access rights, so this works without elevation.
    let handle = unsafe {
        CreateFileW(
            PCWSTR(w.as_ptr()),
            0,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            None,
            OPEN_EXISTING,
            FILE_ATTRIBUTE_NORMAL,
            HANDLE::default(),
        )
    }
    .map_err(|err| anyhow!("CreateFileW failed for {}: {}", path, err))?;
    Ok(VolumeHandle(handle))
}

/// Disk ordinal backing a volume, `None` when the volume has no extents or
/// spans several disks.
pub fn disk_number_for_drive(drive_letter: char) -> Result<Option<u32>> {
    let handle = open_volume_handle(drive_letter)?;
    let mut out = [0u8; 1024];
    let mut returned = 0u32;

    unsafe {
        DeviceIoControl(
            handle.0,
            IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS,
            None,
            0,
            Some(out.as_mut_ptr() as *mut c_void),
            out.len() as u32,
            Some(&mut returned),
            None,
        )
    }
    .map_err(|err| {
        anyhow!(
            "IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS failed for {}: {}",
            drive_letter,
            err
        )
    })?;

    if (returned as usize) < std::mem::size_of::<VOLUME_DISK_EXTENTS>() {
        return Err(anyhow!("extent buffer too small for {}:", drive_letter));
    }

    let extents: VOLUME_DISK_EXTENTS =
        unsafe { std::ptr::read_unaligned(out.as_ptr() as *const VOLUME_DISK_EXTENTS) };
    if extents.NumberOfDiskExtents != 1 {
        return Ok(None);
    }
    Ok(Some(extents.Extents[0].DiskNumber))
}
