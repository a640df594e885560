//! In-memory archive construction for tests.

#![allow(dead_code)]

use sarc_common::Endian;

/// Offset of the first allocation table record in archives built here.
pub const FIRST_RECORD: usize = 0x14 + 0x0C;

/// Offset of record `index` in archives built here.
pub const fn record_offset(index: usize) -> usize {
    FIRST_RECORD + index * 16
}

/// Builder for small SARC images.
pub struct TestArchive {
    endian: Endian,
    magic: [u8; 4],
    hash_key: u32,
    files: Vec<(Vec<u8>, Vec<u8>)>,
}

impl TestArchive {
    pub fn new() -> Self {
        Self {
            endian: Endian::Little,
            magic: *b"SARC",
            hash_key: 0x65,
            files: Vec::new(),
        }
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    pub fn file(mut self, name: impl AsRef<[u8]>, data: impl AsRef<[u8]>) -> Self {
        self.files
            .push((name.as_ref().to_vec(), data.as_ref().to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut names = Vec::new();
        let mut name_offsets = Vec::new();
        for (name, _) in &self.files {
            name_offsets.push(names.len());
            names.extend_from_slice(name);
            names.push(0);
            while names.len() % 4 != 0 {
                names.push(0);
            }
        }

        let mut payload = Vec::new();
        let mut starts = Vec::new();
        for (_, data) in &self.files {
            while payload.len() % 4 != 0 {
                payload.push(0);
            }
            starts.push(payload.len());
            payload.extend_from_slice(data);
        }

        let sfnt_start = record_offset(self.files.len());
        let data_offset = sfnt_start + 8 + names.len();
        let total = data_offset + payload.len();

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&self.magic);
        self.put_u16(&mut out, 0x14);
        self.put_u16(&mut out, 0xFEFF);
        self.put_u32(&mut out, total as u32);
        self.put_u32(&mut out, data_offset as u32);
        self.put_u32(&mut out, 0x0100);

        out.extend_from_slice(b"SFAT");
        self.put_u16(&mut out, 0x0C);
        self.put_u16(&mut out, self.files.len() as u16);
        self.put_u32(&mut out, self.hash_key);
        for (i, (name, data)) in self.files.iter().enumerate() {
            self.put_u32(&mut out, hash(name, self.hash_key));
            self.put_u32(&mut out, 0x0100_0000 | (name_offsets[i] / 4) as u32);
            self.put_u32(&mut out, starts[i] as u32);
            self.put_u32(&mut out, data.len() as u32);
        }

        out.extend_from_slice(b"SFNT");
        self.put_u16(&mut out, 8);
        self.put_u16(&mut out, 0);
        out.extend_from_slice(&names);
        out.extend_from_slice(&payload);
        out
    }

    fn put_u16(&self, out: &mut Vec<u8>, value: u16) {
        match self.endian {
            Endian::Little => out.extend_from_slice(&value.to_le_bytes()),
            Endian::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put_u32(&self, out: &mut Vec<u8>, value: u32) {
        match self.endian {
            Endian::Little => out.extend_from_slice(&value.to_le_bytes()),
            Endian::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }
}

fn hash(name: &[u8], key: u32) -> u32 {
    name.iter()
        .fold(0u32, |h, b| h.wrapping_mul(key).wrapping_add(*b as i8 as i32 as u32))
}

/// Overwrite a little-endian u32 in a built image.
pub fn patch_u32(image: &mut [u8], offset: usize, value: u32) {
    image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
