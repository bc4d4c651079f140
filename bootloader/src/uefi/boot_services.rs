//! Boot Services table and the console protocols
//!
//! Only the entries used to publish devices and start images are typed;
//! the rest are kept as opaque slots so the offsets stay right.

use core::ffi::c_void;

pub const EFI_DEVICE_PATH_PROTOCOL_GUID: [u8; 16] = [
    0x91, 0x6e, 0x57, 0x09, 0x3f, 0x6d, 0xd2, 0x11, 0x8e, 0x39, 0x00, 0xa0, 0xc9, 0x69, 0x72, 0x3b,
];

pub const EFI_SIMPLE_FILE_SYSTEM_PROTOCOL_GUID: [u8; 16] = [
    0x22, 0x5b, 0x4e, 0x96, 0x59, 0x64, 0xd2, 0x11, 0x8e, 0x39, 0x00, 0xa0, 0xc9, 0x69, 0x72, 0x3b,
];

pub const EFI_NATIVE_INTERFACE: usize = 0;

/// `LocateSearchType::ByProtocol`
pub const BY_PROTOCOL: usize = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct InputKey {
    pub scan_code: u16,
    pub unicode_char: u16,
}

#[repr(C)]
pub struct SimpleTextInputProtocol {
    pub reset: extern "efiapi" fn(*mut SimpleTextInputProtocol, bool) -> usize,
    pub read_key_stroke: extern "efiapi" fn(*mut SimpleTextInputProtocol, *mut InputKey) -> usize,
}

/// Console output. Only `output_string` is called; the other entries keep
/// the layout.
#[repr(C)]
pub struct SimpleTextOutputProtocol {
    pub reset: extern "efiapi" fn(*mut SimpleTextOutputProtocol, bool) -> usize,
    pub output_string: extern "efiapi" fn(*mut SimpleTextOutputProtocol, *const u16) -> usize,
    _test_string: usize,
    _query_mode: usize,
    _set_mode: usize,
    _set_attribute: usize,
    _clear_screen: usize,
    _set_cursor_position: usize,
    _enable_cursor: usize,
    _mode: *const (),
}

#[cfg(test)]
impl SimpleTextOutputProtocol {
    /// Protocol with only the two typed entries filled in
    pub const fn new(
        reset: extern "efiapi" fn(*mut SimpleTextOutputProtocol, bool) -> usize,
        output_string: extern "efiapi" fn(*mut SimpleTextOutputProtocol, *const u16) -> usize,
    ) -> Self {
        Self {
            reset,
            output_string,
            _test_string: 0,
            _query_mode: 0,
            _set_mode: 0,
            _set_attribute: 0,
            _clear_screen: 0,
            _set_cursor_position: 0,
            _enable_cursor: 0,
            _mode: core::ptr::null(),
        }
    }
}

#[repr(C)]
pub struct SystemTable {
    _header: [u8; 24],
    _firmware_vendor: *const u16,
    _firmware_revision: u32,
    _console_in_handle: *const (),
    pub con_in: *mut SimpleTextInputProtocol,
    _console_out_handle: *const (),
    pub con_out: *mut SimpleTextOutputProtocol,
    _stderr_handle: *const (),
    _stderr: *const (),
    _runtime_services: *const (),
    pub boot_services: *const BootServices,
    pub number_of_table_entries: usize,
    pub configuration_table: *const (),
}

#[repr(C)]
pub struct BootServices {
    _header: [u8; 24],
    // Task Priority Services
    _raise_tpl: usize,
    _restore_tpl: usize,
    // Memory Services
    _allocate_pages: usize,
    _free_pages: usize,
    _get_memory_map: usize,
    _allocate_pool: usize,
    pub free_pool: extern "efiapi" fn(buffer: *mut c_void) -> usize,
    // Event & Timer Services
    _create_event: usize,
    _set_timer: usize,
    _wait_for_event: usize,
    _signal_event: usize,
    _close_event: usize,
    _check_event: usize,
    // Protocol Handler Services
    pub install_protocol_interface: extern "efiapi" fn(
        handle: *mut *mut (),
        protocol: *const [u8; 16],
        interface_type: usize,
        interface: *mut c_void,
    ) -> usize,
    _reinstall_protocol_interface: usize,
    _uninstall_protocol_interface: usize,
    pub handle_protocol: extern "efiapi" fn(
        handle: *mut (),
        protocol: *const [u8; 16],
        interface: *mut *mut c_void,
    ) -> usize,
    _reserved: usize,
    _register_protocol_notify: usize,
    _locate_handle: usize,
    _locate_device_path: usize,
    _install_configuration_table: usize,
    // Image Services
    pub load_image: extern "efiapi" fn(
        boot_policy: bool,
        parent_image_handle: *mut (),
        file_path: *const c_void,
        source_buffer: *const c_void,
        source_size: usize,
        image_handle: *mut *mut (),
    ) -> usize,
    pub start_image: extern "efiapi" fn(
        image_handle: *mut (),
        exit_data_size: *mut usize,
        exit_data: *mut *mut u16,
    ) -> usize,
    _exit: usize,
    _unload_image: usize,
    _exit_boot_services: usize,
    // Miscellaneous Services
    _get_next_monotonic_count: usize,
    /// Stall for microseconds
    pub stall: extern "efiapi" fn(microseconds: usize) -> usize,
    _set_watchdog_timer: usize,
    // Driver Support Services
    pub connect_controller: extern "efiapi" fn(
        controller_handle: *mut (),
        driver_image_handle: *mut *mut (),
        remaining_device_path: *const c_void,
        recursive: bool,
    ) -> usize,
    _disconnect_controller: usize,
    // Open/Close Protocol Services
    _open_protocol: usize,
    _close_protocol: usize,
    _open_protocol_information: usize,
    // Library Services
    _protocols_per_handle: usize,
    pub locate_handle_buffer: extern "efiapi" fn(
        search_type: usize,
        protocol: *const [u8; 16],
        search_key: *const c_void,
        no_handles: *mut usize,
        buffer: *mut *mut *mut (),
    ) -> usize,
    _locate_protocol: usize,
    _install_multiple_protocol_interfaces: usize,
    _uninstall_multiple_protocol_interfaces: usize,
}

#[cfg(target_pointer_width = "64")]
const _: () = assert!(core::mem::offset_of!(BootServices, install_protocol_interface) == 0x80);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(core::mem::offset_of!(BootServices, load_image) == 0xC8);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(core::mem::offset_of!(BootServices, connect_controller) == 0x108);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(core::mem::offset_of!(BootServices, locate_handle_buffer) == 0x138);
