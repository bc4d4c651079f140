//! `Platform` over UEFI Boot Services

use crate::console::Console;
use crate::device::EfiBlockDevice;
use crate::uefi::block_io::EFI_BLOCK_IO_PROTOCOL_GUID;
use crate::uefi::boot_services::{
    BootServices, InputKey, SimpleTextInputProtocol, SystemTable, BY_PROTOCOL,
    EFI_DEVICE_PATH_PROTOCOL_GUID, EFI_NATIVE_INTERFACE, EFI_SIMPLE_FILE_SYSTEM_PROTOCOL_GUID,
};
use crate::uefi::status::{check, EFI_INVALID_PARAMETER, EFI_NOT_FOUND, EFI_SUCCESS};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ffi::c_void;
use core::ptr;
use vmap_core::error::{MapError, PlatformError};
use vmap_core::map::{self, DeviceHandle, DeviceRole, ImageHandle, MapOptions, Platform};
use vmap_core::vdisk::{DevicePath, Media, VirtualDisk};

/// Longest device path read back from firmware
const MAX_DEVICE_PATH: usize = 64 * 1024;

/// Key poll interval while pausing, in microseconds
const KEY_POLL_US: usize = 10_000;

pub struct EfiPlatform {
    boot_services: *const BootServices,
    con_in: *mut SimpleTextInputProtocol,
    console: Console,
    image_handle: *mut (),
    disk: &'static VirtualDisk<'static>,
    devices: Vec<*mut EfiBlockDevice>,
}

impl EfiPlatform {
    /// Take ownership of `disk` for the rest of boot services.
    ///
    /// The disk and every device built for it are leaked: firmware keeps
    /// pointers to them once they are installed. Firmware reads and this
    /// platform only ever share the disk.
    ///
    /// # Safety
    /// `system_table` must be the table passed to the image entry point.
    pub unsafe fn new(
        system_table: *const SystemTable,
        image_handle: *mut (),
        disk: VirtualDisk<'static>,
    ) -> Self {
        let st = &*system_table;
        Self {
            boot_services: st.boot_services,
            con_in: st.con_in,
            console: Console::new(st.con_out),
            image_handle,
            disk: Box::leak(Box::new(disk)),
            devices: Vec::new(),
        }
    }

    pub fn disk(&self) -> &'static VirtualDisk<'static> {
        self.disk
    }

    pub fn devices(&self) -> impl Iterator<Item = &EfiBlockDevice> {
        // SAFETY: devices are leaked on install and never freed
        self.devices.iter().map(|d| unsafe { &**d })
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Install the disk and load its boot image
    pub fn publish(&mut self, options: &MapOptions) -> Result<ImageHandle, MapError> {
        let disk = self.disk;
        map::publish(disk, options, self)
    }

    fn bs(&self) -> &'static BootServices {
        // SAFETY: boot services outlive this loader
        unsafe { &*self.boot_services }
    }
}

impl Platform for EfiPlatform {
    fn install_block_device(
        &mut self,
        role: DeviceRole,
        path: &DevicePath,
        media: &Media,
    ) -> Result<DeviceHandle, PlatformError> {
        let bs = self.bs();
        let device = EfiBlockDevice::new(self.disk, role, path, media).map_err(|e| {
            log::error!("{}: {}", path, e);
            PlatformError(EFI_INVALID_PARAMETER)
        })?;
        let device = Box::into_raw(device);
        self.devices.push(device);
        let mut handle: *mut () = ptr::null_mut();

        // SAFETY: just leaked, and firmware cannot reach it before the Block I/O install
        let device_path = unsafe { EfiBlockDevice::device_path_ptr(device) };
        let status = (bs.install_protocol_interface)(
            &mut handle,
            &EFI_DEVICE_PATH_PROTOCOL_GUID,
            EFI_NATIVE_INTERFACE,
            device_path,
        );
        check(status)?;

        let status = (bs.install_protocol_interface)(
            &mut handle,
            &EFI_BLOCK_IO_PROTOCOL_GUID,
            EFI_NATIVE_INTERFACE,
            EfiBlockDevice::protocol_ptr(device) as *mut c_void,
        );
        check(status)?;

        Ok(DeviceHandle(handle as usize))
    }

    /// No driver binding to a device is not an error
    fn connect_controller(&mut self, handle: DeviceHandle) -> Result<(), PlatformError> {
        let status = (self.bs().connect_controller)(
            handle.0 as *mut (),
            ptr::null_mut(),
            ptr::null(),
            true,
        );
        if status == EFI_NOT_FOUND {
            log::debug!("ConnectController: no driver for handle {:#x}", handle.0);
            return Ok(());
        }
        check(status)
    }

    fn load_image(&mut self, path: &DevicePath) -> Result<ImageHandle, PlatformError> {
        let bytes = path.to_bytes().map_err(|e| {
            log::error!("{}: {}", path, e);
            PlatformError(EFI_INVALID_PARAMETER)
        })?;
        let mut image: *mut () = ptr::null_mut();
        let status = (self.bs().load_image)(
            false,
            self.image_handle,
            bytes.as_ptr() as *const c_void,
            ptr::null(),
            0,
            &mut image,
        );
        check(status)?;
        Ok(ImageHandle(image as usize))
    }

    fn start_image(&mut self, image: ImageHandle) -> Result<(), PlatformError> {
        let status = (self.bs().start_image)(image.0 as *mut (), ptr::null_mut(), ptr::null_mut());
        check(status)
    }

    fn file_system_handles(&mut self) -> Result<Vec<(DeviceHandle, DevicePath)>, PlatformError> {
        let bs = self.bs();
        let mut count = 0usize;
        let mut buffer: *mut *mut () = ptr::null_mut();
        let status = (bs.locate_handle_buffer)(
            BY_PROTOCOL,
            &EFI_SIMPLE_FILE_SYSTEM_PROTOCOL_GUID,
            ptr::null(),
            &mut count,
            &mut buffer,
        );
        check(status)?;
        if buffer.is_null() {
            return Ok(Vec::new());
        }

        // SAFETY: firmware returned `count` handles at `buffer`
        let handles = unsafe { core::slice::from_raw_parts(buffer, count) };
        let mut found = Vec::with_capacity(count);
        for &handle in handles {
            let mut interface: *mut c_void = ptr::null_mut();
            let status = (bs.handle_protocol)(handle, &EFI_DEVICE_PATH_PROTOCOL_GUID, &mut interface);
            if status != EFI_SUCCESS || interface.is_null() {
                continue;
            }
            // SAFETY: a device path protocol interface is an encoded path
            match unsafe { read_device_path(interface as *const u8) } {
                Some(path) => found.push((DeviceHandle(handle as usize), path)),
                None => log::debug!("skipping malformed device path on {:p}", handle),
            }
        }

        (bs.free_pool)(buffer as *mut c_void);
        Ok(found)
    }

    fn wait_for_key(&mut self) {
        self.console.flush_log();
        if self.con_in.is_null() {
            return;
        }
        let mut key = InputKey::default();
        loop {
            // SAFETY: console input comes from the system table
            let status = unsafe { ((*self.con_in).read_key_stroke)(self.con_in, &mut key) };
            if status == EFI_SUCCESS {
                return;
            }
            (self.bs().stall)(KEY_POLL_US);
        }
    }
}

/// Decode the device path at `ptr`, walking node headers to find its end.
///
/// # Safety
/// `ptr` must point at a device path terminated by an End Entire node.
unsafe fn read_device_path(ptr: *const u8) -> Option<DevicePath> {
    let mut len = 0usize;
    loop {
        let header = core::slice::from_raw_parts(ptr.add(len), 4);
        let node_len = u16::from_le_bytes([header[2], header[3]]) as usize;
        if node_len < 4 || len + node_len > MAX_DEVICE_PATH {
            return None;
        }
        len += node_len;
        if header[0] == 0x7F && header[1] == 0xFF {
            break;
        }
    }
    DevicePath::parse(core::slice::from_raw_parts(ptr, len)).ok()
}
