//! Builders for synthetic SM4 files.
//!
//! Payloads are appended after the root header and root directory, so offsets
//! are known as soon as a payload is written. Objects are therefore built
//! bottom-up: leaves first, then the records whose directories point at them.
#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub type Entry = (u32, u32, u32);

pub const SIGNATURE: &str = "STiMage 005.004 1\0";

pub const FFT_STRINGS: [&str; 17] = [
    "FFT image",
    "Page 14 of 26, 0.00 V",
    "WTe2 4.78K  sens=50 mod=20mV 616Hz TC=3",
    "",
    "D:\\SPMdata\\20160421\\data3293FFT.sm4",
    "04/22/16",
    "11:01:44",
    "m-1",
    "m-1",
    "V",
    "",
    "",
    "",
    "0256",
    "337",
    "",
    "",
];

pub const PRM_TEXT_LINE: &str = "Bias Voltage: 0.160179 V\r\nSetpoint Current: 2.0E-9 A\r\n";

pub struct Sm4Builder {
    root_count: usize,
    base: u32,
    blob: Vec<u8>,
    roots: Vec<Entry>,
    header_pad: Vec<u8>,
}

impl Sm4Builder {
    pub fn new(root_count: usize) -> Self {
        Self::with_header_pad(root_count, Vec::new())
    }

    pub fn with_header_pad(root_count: usize, header_pad: Vec<u8>) -> Self {
        let base = (2 + 56 + header_pad.len() + 12 * root_count) as u32;
        Self {
            root_count,
            base,
            blob: Vec::new(),
            roots: Vec::new(),
            header_pad,
        }
    }

    /// Offset the next appended payload will land at.
    pub fn next_offset(&self) -> u32 {
        self.base + self.blob.len() as u32
    }

    /// Appends bytes and returns their absolute offset.
    pub fn append(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.next_offset();
        self.blob.extend_from_slice(bytes);
        offset
    }

    /// Appends a payload and returns a directory entry covering it.
    pub fn object(&mut self, type_id: u32, bytes: &[u8]) -> Entry {
        let offset = self.append(bytes);
        (type_id, offset, bytes.len() as u32)
    }

    /// Appends a fixed record followed by its child directory. The entry covers the record only.
    pub fn object_with_children(&mut self, type_id: u32, record: &[u8], children: &[Entry]) -> Entry {
        let mut bytes = record.to_vec();
        bytes.extend(directory(children));
        let offset = self.append(&bytes);
        (type_id, offset, record.len() as u32)
    }

    pub fn root(&mut self, entry: Entry) -> &mut Self {
        self.roots.push(entry);
        self
    }

    pub fn finish(self, page_count: u32) -> Vec<u8> {
        assert_eq!(self.roots.len(), self.root_count, "root directory size was fixed up front");
        let mut bytes = ((56 + self.header_pad.len()) as u16).to_le_bytes().to_vec();
        let mut signature = utf16(SIGNATURE);
        signature.resize(36, 0);
        bytes.extend(signature);
        for v in [page_count, self.roots.len() as u32, 12, 0, 0] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend(&self.header_pad);
        bytes.extend(directory(&self.roots));
        assert_eq!(bytes.len() as u32, self.base);
        bytes.extend(self.blob);
        bytes
    }
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

pub fn directory(entries: &[Entry]) -> Vec<u8> {
    entries
        .iter()
        .flat_map(|&(t, o, s)| [t, o, s])
        .flat_map(u32::to_le_bytes)
        .collect()
}

pub fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn string_data(strings: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for s in strings {
        let units = utf16(s);
        bytes.extend(((units.len() / 2) as u16).to_le_bytes());
        bytes.extend(units);
    }
    bytes
}

pub fn page_record(page_id: u8, data_type: u32, source_type: u32, children: &[Entry]) -> Vec<u8> {
    let mut bytes = vec![page_id; 16];
    bytes.extend(u32s(&[data_type, source_type, children.len() as u32, 4]));
    bytes.extend(directory(children));
    bytes
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub struct PageHeaderFields {
    pub string_count: u16,
    pub page: u32,
    pub x_size: i32,
    pub y_size: i32,
    pub scan_dir: i32,
    pub group_id: i32,
    pub data_size: u32,
    pub min_z_value: i32,
    pub max_z_value: i32,
    /// x/y/z/xy scale, x/y/z offset, period, bias, current, angle
    pub floats: [f32; 11],
    pub color_info_count: i32,
    pub object_count: u32,
}

impl PageHeaderFields {
    pub fn fft() -> Self {
        Self {
            string_count: 17,
            page: 6,
            x_size: 256,
            y_size: 256,
            scan_dir: 1,
            group_id: 54301564,
            data_size: 262144,
            min_z_value: 180,
            max_z_value: 1407,
            floats: [
                -20000002.0,
                -20000002.0,
                1.7287545688304817e-06,
                0.0,
                0.0,
                0.0,
                0.0033952740486711264,
                0.011718700639903545,
                0.16017913818359375,
                1.995468235094222e-09,
                0.0,
            ],
            color_info_count: 1,
            object_count: 9,
        }
    }

    pub fn spectrum(object_count: u32) -> Self {
        Self {
            string_count: 2,
            page: 10,
            x_size: 64,
            y_size: 1,
            scan_dir: 0,
            group_id: 7,
            data_size: 256,
            min_z_value: -5,
            max_z_value: 5,
            floats: [1.0; 11],
            color_info_count: 0,
            object_count,
        }
    }

    pub fn record(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(180);
        bytes.extend(180u16.to_le_bytes());
        bytes.extend(self.string_count.to_le_bytes());
        bytes.extend(u32s(&[self.page, 0, 0]));
        for v in [0, 0, self.x_size, self.y_size, 0, self.scan_dir, self.group_id] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend(self.data_size.to_le_bytes());
        bytes.extend(self.min_z_value.to_le_bytes());
        bytes.extend(self.max_z_value.to_le_bytes());
        for f in self.floats {
            bytes.extend(f.to_le_bytes());
        }
        for v in [self.color_info_count, 0, 0] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend(self.object_count.to_le_bytes());
        bytes.extend([0u8; 64]);
        assert_eq!(bytes.len(), 180);
        bytes
    }
}

/// Sample value stored at pixel `(x, y)` of the FFT fixture image.
pub fn fft_sample(x: usize, y: usize) -> i32 {
    (y * 256 + x) as i32 - 32768
}

/// PRM text stored, zlib compressed, in the FFT fixture.
pub fn fft_prm_text() -> Vec<u8> {
    PRM_TEXT_LINE.repeat(40).into_bytes()
}

/// A two-page file laid out like a processed FFT image export:
/// page 0 is a 256x256 image, page 1 a line spectrum whose data is not decoded.
pub fn fft_fixture() -> Vec<u8> {
    let mut b = Sm4Builder::new(3);

    // Page 0: image
    let strings = b.object(10, &string_data(&FFT_STRINGS));
    let drift_header = b.object(5, &[0xAA; 8]);
    let drift = b.object(6, &[0xBB; 24]);
    let color_info = b.object(9, &[0xCC; 16]);
    let tip_track = b.object(11, &[0xDD; 4]);
    let app_info = b.object(17, &[0xEE; 10]);
    let header0 = b.object_with_children(
        3,
        &PageHeaderFields::fft().record(),
        &[
            strings,
            drift_header,
            drift,
            (0, 0, 0),
            (0, 0, 0),
            color_info,
            tip_track,
            (0, 0, 0),
            app_info,
        ],
    );
    let samples: Vec<u8> = (0..256 * 256)
        .flat_map(|i| (i as i32 - 32768).to_le_bytes())
        .collect();
    let data0 = b.object(4, &samples);
    let thumbnail = b.object(14, &[0x11; 128 * 128 / 16]);
    let thumbnail_header = b.object(16, &u32s(&[128, 128, 0]));

    // Page 1: spectrum
    let strings1 = b.object(10, &string_data(&["Spectrum", ""]));
    let header1 = b.object_with_children(3, &PageHeaderFields::spectrum(1).record(), &[strings1]);
    let data1 = b.object(4, &[0x7F; 256]);

    let mut pages = page_record(0xA0, 0, 1, &[header0, data0, thumbnail, thumbnail_header]);
    pages.extend(page_record(0xA1, 1, 0, &[header1, data1]));
    let array = b.object(2, &pages);
    let index_header = b.object_with_children(1, &u32s(&[2, 1, 0, 0]), &[array]);

    let prm_text = fft_prm_text();
    let packed = zlib(&prm_text);
    let prm = b.object(13, &packed);
    let prm_header = b.object(15, &u32s(&[1, prm_text.len() as u32, packed.len() as u32]));

    b.root(index_header).root(prm).root(prm_header);
    b.finish(2)
}
