//! Boot catalog parsing
//!
//! El Torito Boot Catalog structure and parsing.

use super::entry::{BootEntry, SectionHeader, ENTRY_SIZE, EXTENSION_INDICATOR};
use super::validation::ValidationEntry;
use crate::error::{Iso9660Error, Result};
use crate::types::{BootImage, BootPlatform};

/// Boot Catalog
///
/// The boot catalog starts with a validation entry followed by
/// an initial/default entry, then optional sections.
pub struct BootCatalog<'a> {
    /// Validation entry
    pub validation: ValidationEntry,

    /// Initial/default boot entry
    pub initial: BootEntry,

    rest: &'a [u8],
}

impl<'a> BootCatalog<'a> {
    /// Parse boot catalog from sector data
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < 2 * ENTRY_SIZE {
            return Err(Iso9660Error::InvalidBootCatalog);
        }
        let validation = ValidationEntry::parse(&data[..ENTRY_SIZE])?;
        let initial = BootEntry::parse(&data[ENTRY_SIZE..2 * ENTRY_SIZE])
            .ok_or(Iso9660Error::InvalidBootCatalog)?;
        Ok(Self {
            validation,
            initial,
            rest: &data[2 * ENTRY_SIZE..],
        })
    }

    /// Walk every entry with the platform it belongs to, initial entry first.
    pub fn entries(&self) -> CatalogEntries<'a> {
        CatalogEntries {
            initial: Some((self.validation.platform(), self.initial)),
            data: self.rest,
            section: None,
            remaining: 0,
            done: false,
        }
    }

    /// First bootable entry for `platform`
    pub fn find_bootable(&self, platform: BootPlatform) -> Option<BootImage> {
        self.entries()
            .find(|(p, e)| *p == platform && e.is_bootable())
            .map(|(p, e)| e.to_boot_image(p))
    }
}

/// Iterator over `(platform, entry)` pairs of a catalog
pub struct CatalogEntries<'a> {
    initial: Option<(BootPlatform, BootEntry)>,
    data: &'a [u8],
    section: Option<SectionHeader>,
    remaining: u16,
    done: bool,
}

impl<'a> CatalogEntries<'a> {
    fn next_raw(&mut self) -> Option<&'a [u8]> {
        if self.data.len() < ENTRY_SIZE {
            return None;
        }
        let (entry, rest) = self.data.split_at(ENTRY_SIZE);
        self.data = rest;
        Some(entry)
    }
}

impl<'a> Iterator for CatalogEntries<'a> {
    type Item = (BootPlatform, BootEntry);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        while !self.done {
            let raw = self.next_raw()?;

            if self.remaining > 0 {
                if raw[0] == EXTENSION_INDICATOR {
                    continue;
                }
                self.remaining -= 1;
                let platform = self.section.map(|s| s.platform()).unwrap_or(BootPlatform::X86);
                if let Some(entry) = BootEntry::parse(raw) {
                    return Some((platform, entry));
                }
                continue;
            }

            // Trailing extensions of the previous section's last entry
            if raw[0] == EXTENSION_INDICATOR {
                continue;
            }

            match self.section {
                Some(prev) if prev.is_final() => {
                    self.done = true;
                }
                _ => match SectionHeader::parse(raw) {
                    Some(header) => {
                        self.section = Some(header);
                        self.remaining = header.entry_count;
                    }
                    None => self.done = true,
                },
            }
        }

        None
    }
}
