use crate::common::MemoryBlockDevice;

const SECTOR: usize = 2048;

/// A catalog section: platform id plus `(bootable, load_rba, sector_count)` entries
pub struct Section {
    pub platform: u8,
    pub entries: Vec<(bool, u32, u16)>,
}

/// Builds ISO images with a primary descriptor and, optionally, an
/// El Torito boot record and catalog.
pub struct IsoBuilder {
    total_sectors: usize,
    catalog_lba: Option<u32>,
    validation_platform: u8,
    initial: (bool, u32, u16),
    sections: Vec<Section>,
}

impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            total_sectors: 64,
            catalog_lba: None,
            validation_platform: 0x00,
            initial: (false, 0, 0),
            sections: Vec::new(),
        }
    }

    /// Boot record at 17, terminator at 18, catalog at `catalog_lba`
    pub fn with_boot_catalog(mut self, catalog_lba: u32) -> Self {
        self.catalog_lba = Some(catalog_lba);
        self
    }

    pub fn initial_entry(mut self, platform: u8, bootable: bool, load_rba: u32, count: u16) -> Self {
        self.validation_platform = platform;
        self.initial = (bootable, load_rba, count);
        self
    }

    pub fn section(mut self, platform: u8, entries: Vec<(bool, u32, u16)>) -> Self {
        self.sections.push(Section { platform, entries });
        self
    }

    pub fn build(self) -> MemoryBlockDevice {
        let mut data = vec![0u8; self.total_sectors * SECTOR];

        write_descriptor(&mut data, 16, 1);
        let pvd = 16 * SECTOR;
        data[pvd + 80..pvd + 84].copy_from_slice(&(self.total_sectors as u32).to_le_bytes());
        data[pvd + 84..pvd + 88].copy_from_slice(&(self.total_sectors as u32).to_be_bytes());

        match self.catalog_lba {
            Some(catalog_lba) => {
                write_descriptor(&mut data, 17, 0);
                let br = 17 * SECTOR;
                data[br + 7..br + 30].copy_from_slice(b"EL TORITO SPECIFICATION");
                data[br + 0x47..br + 0x4B].copy_from_slice(&catalog_lba.to_le_bytes());
                write_descriptor(&mut data, 18, 255);
                self.write_catalog(&mut data, catalog_lba as usize * SECTOR);
            }
            None => write_descriptor(&mut data, 17, 255),
        }

        MemoryBlockDevice::new(data)
    }

    fn write_catalog(&self, data: &mut [u8], at: usize) {
        data[at] = 0x01;
        data[at + 1] = self.validation_platform;
        data[at + 4..at + 12].copy_from_slice(b"VMAPTEST");
        data[at + 30] = 0x55;
        data[at + 31] = 0xAA;
        let sum = data[at..at + 32]
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .fold(0u16, u16::wrapping_add);
        data[at + 28..at + 30].copy_from_slice(&0u16.wrapping_sub(sum).to_le_bytes());

        write_entry(data, at + 32, self.initial);

        let mut offset = at + 64;
        for (i, section) in self.sections.iter().enumerate() {
            let last = i + 1 == self.sections.len();
            data[offset] = if last { 0x91 } else { 0x90 };
            data[offset + 1] = section.platform;
            data[offset + 2..offset + 4].copy_from_slice(&(section.entries.len() as u16).to_le_bytes());
            offset += 32;
            for entry in &section.entries {
                write_entry(data, offset, *entry);
                offset += 32;
            }
        }
    }
}

fn write_descriptor(data: &mut [u8], sector: usize, type_code: u8) {
    let at = sector * SECTOR;
    data[at] = type_code;
    data[at + 1..at + 6].copy_from_slice(b"CD001");
    data[at + 6] = 1;
}

fn write_entry(data: &mut [u8], at: usize, (bootable, load_rba, count): (bool, u32, u16)) {
    data[at] = if bootable { 0x88 } else { 0x00 };
    data[at + 6..at + 8].copy_from_slice(&count.to_le_bytes());
    data[at + 8..at + 12].copy_from_slice(&load_rba.to_le_bytes());
}
