//! Device paths
//!
//! Typed nodes with an explicit encoder to the firmware's binary form and a
//! bounds-checked decoder back. Every node is a 4-byte header (type,
//! subtype, little-endian total length) followed by its fields; a path ends
//! with the End Entire node `7F FF 04 00`.

use crate::disk::PartitionSignature;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use uguid::{guid, Guid};

/// Vendor GUID tagging every virtual disk this crate publishes
pub const VDISK_GUID: Guid = guid!("ebe35ad8-6c1e-4f70-bb2a-5ba3c4f1e7d2");

pub const HARDWARE_DEVICE_PATH: u8 = 0x01;
pub const HW_VENDOR_DP: u8 = 0x04;
pub const MEDIA_DEVICE_PATH: u8 = 0x04;
pub const MEDIA_HARDDRIVE_DP: u8 = 0x01;
pub const MEDIA_CDROM_DP: u8 = 0x02;
pub const MEDIA_FILEPATH_DP: u8 = 0x04;
pub const END_DEVICE_PATH_TYPE: u8 = 0x7F;
pub const END_ENTIRE_DEVICE_PATH_SUBTYPE: u8 = 0xFF;

const HEADER_LEN: usize = 4;
const VENDOR_LEN: usize = 20;
const HARDDRIVE_LEN: usize = 42;
const CDROM_LEN: usize = 24;

const PARTITION_FORMAT_MBR: u8 = 0x01;
const PARTITION_FORMAT_GPT: u8 = 0x02;
const SIGNATURE_NONE: u8 = 0x00;
const SIGNATURE_MBR: u8 = 0x01;
const SIGNATURE_GUID: u8 = 0x02;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePathNode {
    /// `VenHw(guid)`
    VendorHardware(Guid),
    /// `HD(...)`, start and size in 512-byte blocks
    HardDrive {
        partition_number: u32,
        start: u64,
        size: u64,
        signature: PartitionSignature,
    },
    /// `CDROM(...)`, start and size in 2048-byte blocks
    CdRom { boot_entry: u32, start: u64, size: u64 },
    FilePath(String),
    /// Any node this crate does not interpret
    Other {
        node_type: u8,
        sub_type: u8,
        data: Vec<u8>,
    },
}

impl DevicePathNode {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), DevicePathError> {
        let at = out.len();
        let (node_type, sub_type) = match self {
            Self::VendorHardware(guid) => {
                push_header(out, HARDWARE_DEVICE_PATH, HW_VENDOR_DP);
                out.extend_from_slice(&guid.to_bytes());
                (HARDWARE_DEVICE_PATH, HW_VENDOR_DP)
            }
            Self::HardDrive {
                partition_number,
                start,
                size,
                signature,
            } => {
                push_header(out, MEDIA_DEVICE_PATH, MEDIA_HARDDRIVE_DP);
                out.extend_from_slice(&partition_number.to_le_bytes());
                out.extend_from_slice(&start.to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
                let mut sig = [0u8; 16];
                let (format, sig_type) = match signature {
                    PartitionSignature::None => (PARTITION_FORMAT_MBR, SIGNATURE_NONE),
                    PartitionSignature::Mbr(id) => {
                        sig[..4].copy_from_slice(&id.to_le_bytes());
                        (PARTITION_FORMAT_MBR, SIGNATURE_MBR)
                    }
                    PartitionSignature::Gpt(guid) => {
                        sig = guid.to_bytes();
                        (PARTITION_FORMAT_GPT, SIGNATURE_GUID)
                    }
                };
                out.extend_from_slice(&sig);
                out.push(format);
                out.push(sig_type);
                (MEDIA_DEVICE_PATH, MEDIA_HARDDRIVE_DP)
            }
            Self::CdRom {
                boot_entry,
                start,
                size,
            } => {
                push_header(out, MEDIA_DEVICE_PATH, MEDIA_CDROM_DP);
                out.extend_from_slice(&boot_entry.to_le_bytes());
                out.extend_from_slice(&start.to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
                (MEDIA_DEVICE_PATH, MEDIA_CDROM_DP)
            }
            Self::FilePath(path) => {
                push_header(out, MEDIA_DEVICE_PATH, MEDIA_FILEPATH_DP);
                for unit in path.encode_utf16().chain(core::iter::once(0)) {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                (MEDIA_DEVICE_PATH, MEDIA_FILEPATH_DP)
            }
            Self::Other {
                node_type,
                sub_type,
                data,
            } => {
                push_header(out, *node_type, *sub_type);
                out.extend_from_slice(data);
                (*node_type, *sub_type)
            }
        };
        let len = u16::try_from(out.len() - at).map_err(|_| DevicePathError::NodeTooLong)?;
        out[at] = node_type;
        out[at + 1] = sub_type;
        out[at + 2..at + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn decode(node_type: u8, sub_type: u8, body: &[u8]) -> Result<Self, DevicePathError> {
        let node = match (node_type, sub_type) {
            (HARDWARE_DEVICE_PATH, HW_VENDOR_DP) if body.len() >= VENDOR_LEN - HEADER_LEN => {
                Self::VendorHardware(Guid::from_bytes(array16(&body[..16])))
            }
            (MEDIA_DEVICE_PATH, MEDIA_HARDDRIVE_DP) => {
                if body.len() != HARDDRIVE_LEN - HEADER_LEN {
                    return Err(DevicePathError::BadNodeLength);
                }
                let sig = array16(&body[20..36]);
                let signature = match body[37] {
                    SIGNATURE_MBR => {
                        PartitionSignature::Mbr(u32::from_le_bytes([sig[0], sig[1], sig[2], sig[3]]))
                    }
                    SIGNATURE_GUID => PartitionSignature::Gpt(Guid::from_bytes(sig)),
                    _ => PartitionSignature::None,
                };
                Self::HardDrive {
                    partition_number: le_u32(&body[0..4]),
                    start: le_u64(&body[4..12]),
                    size: le_u64(&body[12..20]),
                    signature,
                }
            }
            (MEDIA_DEVICE_PATH, MEDIA_CDROM_DP) => {
                if body.len() != CDROM_LEN - HEADER_LEN {
                    return Err(DevicePathError::BadNodeLength);
                }
                Self::CdRom {
                    boot_entry: le_u32(&body[0..4]),
                    start: le_u64(&body[4..12]),
                    size: le_u64(&body[12..20]),
                }
            }
            (MEDIA_DEVICE_PATH, MEDIA_FILEPATH_DP) => {
                let units = body
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .take_while(|u| *u != 0);
                let path = char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect();
                Self::FilePath(path)
            }
            _ => Self::Other {
                node_type,
                sub_type,
                data: body.to_vec(),
            },
        };
        Ok(node)
    }
}

fn push_header(out: &mut Vec<u8>, node_type: u8, sub_type: u8) {
    out.extend_from_slice(&[node_type, sub_type, 0, 0]);
}

fn array16(bytes: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&bytes[..16]);
    out
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn le_u64(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

impl fmt::Display for DevicePathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VendorHardware(guid) => write!(f, "VenHw({})", guid),
            Self::HardDrive {
                partition_number,
                start,
                size,
                signature,
            } => match signature {
                PartitionSignature::Mbr(id) => {
                    write!(f, "HD({},MBR,{:#010x},{:#x},{:#x})", partition_number, id, start, size)
                }
                PartitionSignature::Gpt(guid) => {
                    write!(f, "HD({},GPT,{},{:#x},{:#x})", partition_number, guid, start, size)
                }
                PartitionSignature::None => {
                    write!(f, "HD({},{:#x},{:#x})", partition_number, start, size)
                }
            },
            Self::CdRom {
                boot_entry,
                start,
                size,
            } => write!(f, "CDROM({:#x},{:#x},{:#x})", boot_entry, start, size),
            Self::FilePath(path) => f.write_str(path),
            Self::Other {
                node_type,
                sub_type,
                ..
            } => write!(f, "Path({},{})", node_type, sub_type),
        }
    }
}

/// Device path decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePathError {
    /// Bytes ran out before the End Entire node
    Truncated,
    /// A node's length field is shorter than its header or runs past the buffer
    BadLength,
    /// A known node with the wrong size
    BadNodeLength,
    /// A node does not fit the 16-bit length field
    NodeTooLong,
}

impl fmt::Display for DevicePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Truncated => "device path is missing its end node",
            Self::BadLength => "device path node length is invalid",
            Self::BadNodeLength => "device path node has the wrong size",
            Self::NodeTooLong => "device path node is longer than 65535 bytes",
        })
    }
}

/// A complete device path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePath {
    nodes: Vec<DevicePathNode>,
}

impl DevicePath {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// `VenHw(VDISK_GUID)`: the path of every virtual disk
    pub fn vdisk() -> Self {
        Self {
            nodes: alloc::vec![DevicePathNode::VendorHardware(VDISK_GUID)],
        }
    }

    pub fn nodes(&self) -> &[DevicePathNode] {
        &self.nodes
    }

    pub fn push(&mut self, node: DevicePathNode) {
        self.nodes.push(node);
    }

    /// Copy of this path with `node` appended
    pub fn with(&self, node: DevicePathNode) -> Self {
        let mut path = self.clone();
        path.push(node);
        path
    }

    /// Copy of this path pointing at `file` on the device
    pub fn with_file(&self, file: &str) -> Self {
        self.with(DevicePathNode::FilePath(String::from(file)))
    }

    /// Whether `prefix`'s nodes open this path
    pub fn starts_with(&self, prefix: &DevicePath) -> bool {
        self.nodes.starts_with(&prefix.nodes)
    }

    /// Path on one of our virtual disks
    pub fn is_vdisk(&self) -> bool {
        matches!(self.nodes.first(), Some(DevicePathNode::VendorHardware(g)) if *g == VDISK_GUID)
    }

    /// Binary form, End Entire node included
    pub fn to_bytes(&self) -> Result<Vec<u8>, DevicePathError> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.encode(&mut out)?;
        }
        out.extend_from_slice(&[END_DEVICE_PATH_TYPE, END_ENTIRE_DEVICE_PATH_SUBTYPE, 4, 0]);
        Ok(out)
    }

    /// Decode up to and including the End Entire node
    pub fn parse(bytes: &[u8]) -> Result<Self, DevicePathError> {
        let mut nodes = Vec::new();
        let mut rest = bytes;
        loop {
            if rest.len() < HEADER_LEN {
                return Err(DevicePathError::Truncated);
            }
            let len = u16::from_le_bytes([rest[2], rest[3]]) as usize;
            if len < HEADER_LEN || len > rest.len() {
                return Err(DevicePathError::BadLength);
            }
            if rest[0] == END_DEVICE_PATH_TYPE && rest[1] == END_ENTIRE_DEVICE_PATH_SUBTYPE {
                return Ok(Self { nodes });
            }
            nodes.push(DevicePathNode::decode(rest[0], rest[1], &rest[HEADER_LEN..len])?);
            rest = &rest[len..];
        }
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}
