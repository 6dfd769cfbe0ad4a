//! Core data structures for SM4 format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The fixed RHK object type enumeration and directory entries
//! - Page records and their classification enums
//! - The fixed-layout payload records (page header, PRM header, ...)

use std::fmt;

use crate::sm4::tree::NodeId;

/// The RHK object type enumeration. The discriminant is the on-disk id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Undefined = 0,
    PageIndexHeader = 1,
    PageIndexArray = 2,
    PageHeader = 3,
    PageData = 4,
    ImageDriftHeader = 5,
    ImageDrift = 6,
    SpecDriftHeader = 7,
    SpecDriftData = 8,
    ColorInfo = 9,
    StringData = 10,
    TipTrackHeader = 11,
    TipTrackData = 12,
    Prm = 13,
    Thumbnail = 14,
    PrmHeader = 15,
    ThumbnailHeader = 16,
    AppInfo = 17,
}

impl ObjectType {
    const ALL: [ObjectType; 18] = [
        ObjectType::Undefined,
        ObjectType::PageIndexHeader,
        ObjectType::PageIndexArray,
        ObjectType::PageHeader,
        ObjectType::PageData,
        ObjectType::ImageDriftHeader,
        ObjectType::ImageDrift,
        ObjectType::SpecDriftHeader,
        ObjectType::SpecDriftData,
        ObjectType::ColorInfo,
        ObjectType::StringData,
        ObjectType::TipTrackHeader,
        ObjectType::TipTrackData,
        ObjectType::Prm,
        ObjectType::Thumbnail,
        ObjectType::PrmHeader,
        ObjectType::ThumbnailHeader,
        ObjectType::AppInfo,
    ];

    /// Looks up the object type for an on-disk id. Ids above 17 are not part of the enumeration.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Undefined => "Undefined",
            ObjectType::PageIndexHeader => "PageIndexHeader",
            ObjectType::PageIndexArray => "PageIndexArray",
            ObjectType::PageHeader => "PageHeader",
            ObjectType::PageData => "PageData",
            ObjectType::ImageDriftHeader => "ImageDriftHeader",
            ObjectType::ImageDrift => "ImageDrift",
            ObjectType::SpecDriftHeader => "SpecDriftHeader",
            ObjectType::SpecDriftData => "SpecDriftData",
            ObjectType::ColorInfo => "ColorInfo",
            ObjectType::StringData => "StringData",
            ObjectType::TipTrackHeader => "TipTrackHeader",
            ObjectType::TipTrackData => "TipTrackData",
            ObjectType::Prm => "PRM",
            ObjectType::Thumbnail => "Thumbnail",
            ObjectType::PrmHeader => "PRMHeader",
            ObjectType::ThumbnailHeader => "ThumbnailHeader",
            ObjectType::AppInfo => "AppInfo",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A 12-byte `(type, offset, size)` triple locating an object's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub type_id: u32,
    /// Absolute byte offset from the start of the file.
    pub offset: u32,
    pub size: u32,
}

impl DirectoryEntry {
    pub const SIZE: usize = 12;

    pub fn object_type(&self) -> Option<ObjectType> {
        ObjectType::from_id(self.type_id)
    }

    /// Byte offset one past the end of the payload.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }
}

/// The data type of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Image,
    LineSpectra,
    Xy,
    AnnotatedLineSpectra,
    Text,
    TextAnnotate,
    Sequential,
    Unknown(u32),
}

impl From<u32> for DataType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Image,
            1 => Self::LineSpectra,
            2 => Self::Xy,
            3 => Self::AnnotatedLineSpectra,
            4 => Self::Text,
            5 => Self::TextAnnotate,
            6 => Self::Sequential,
            other => Self::Unknown(other),
        }
    }
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Image => "image data",
            DataType::LineSpectra => "line/spectra data",
            DataType::Xy => "xy_data",
            DataType::AnnotatedLineSpectra => "annoted line/spectral data",
            DataType::Text => "text_data",
            DataType::TextAnnotate => "text_annotate",
            DataType::Sequential => "Sequential_data",
            DataType::Unknown(_) => "unknown",
        }
    }
}

/// How a page was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Raw,
    Processed,
    Calculated,
    Imported,
    Unknown(u32),
}

impl From<u32> for SourceType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Raw,
            1 => Self::Processed,
            2 => Self::Calculated,
            3 => Self::Imported,
            other => Self::Unknown(other),
        }
    }
}

impl SourceType {
    pub fn name(&self) -> &'static str {
        match self {
            SourceType::Raw => "raw page",
            SourceType::Processed => "processed page",
            SourceType::Calculated => "calculated page",
            SourceType::Imported => "imported page",
            SourceType::Unknown(_) => "unknown page",
        }
    }
}

/// The measured quantity of a page (the page header's `page` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Undefined,
    Topographic,
    Current,
    Aux,
    Force,
    Signal,
    Fft,
    NoisePowerSpectrum,
    LineTest,
    Oscilloscope,
    IvSpectra,
    Other(u32),
}

impl From<u32> for PageKind {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Undefined,
            1 => Self::Topographic,
            2 => Self::Current,
            3 => Self::Aux,
            4 => Self::Force,
            5 => Self::Signal,
            6 => Self::Fft,
            7 => Self::NoisePowerSpectrum,
            8 => Self::LineTest,
            9 => Self::Oscilloscope,
            10 => Self::IvSpectra,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Right,
    Left,
    Up,
    Down,
    Other(i32),
}

impl From<i32> for ScanDirection {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Right,
            1 => Self::Left,
            2 => Self::Up,
            3 => Self::Down,
            other => Self::Other(other),
        }
    }
}

/// Root record of an SM4 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootHeader {
    /// Declared size of the root record, read from the 2-byte prefix.
    pub header_size: u16,
    /// Raw signature bytes, conventionally UTF-16LE `"STiMage 005.004 1\0"`.
    pub signature: [u8; 36],
    pub page_count: u32,
    /// Number of directory entries following the root record.
    pub object_count: u32,
    pub object_field_size: u32,
    pub reserved: [u32; 2],
    /// Bytes beyond the fixed record when `header_size` is larger, kept verbatim.
    pub header_pad: Vec<u8>,
}

/// Page index header (object id 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndexHeader {
    pub page_count: u32,
    pub object_count: u32,
    pub reserved: [u32; 2],
}

/// A page record from the page index array.
///
/// Pages are stored inline in the array rather than behind directory entries,
/// each followed by its own directory of `object_count` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page_id: [u8; 16],
    pub data_type: DataType,
    pub source_type: SourceType,
    pub object_count: u32,
    pub minor_version: u32,
    pub children: Vec<NodeId>,
}

impl Page {
    pub const SIZE: usize = 32;
}

/// Page header (object id 3).
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub field_size: u16,
    /// Number of strings in the child string data object.
    pub string_count: u16,
    pub page: PageKind,
    pub data_sub_source: u32,
    pub line_type: u32,
    pub x_coord: i32,
    pub y_coord: i32,
    pub x_size: i32,
    pub y_size: i32,
    pub image_type: i32,
    pub scan_dir: ScanDirection,
    pub group_id: i32,
    pub data_size: u32,
    pub min_z_value: i32,
    pub max_z_value: i32,
    pub x_scale: f32,
    pub y_scale: f32,
    pub z_scale: f32,
    pub xy_scale: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
    pub period: f32,
    pub bias: f32,
    pub current: f32,
    pub angle: f32,
    pub color_info_count: i32,
    pub grid_x_size: i32,
    pub grid_y_size: i32,
    pub object_count: u32,
    pub reserved: [u8; 64],
}

impl PageHeader {
    pub const SIZE: usize = 180;
}

/// String data (object id 10).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringData {
    pub strings: Vec<String>,
}

impl StringData {
    pub const LABEL: usize = 0;
    pub const SYSTEM_TEXT: usize = 1;
    pub const SESSION_TEXT: usize = 2;
    pub const USER_TEXT: usize = 3;
    pub const PATH: usize = 4;
    pub const DATE: usize = 5;
    pub const TIME: usize = 6;
    pub const X_UNITS: usize = 7;
    pub const Y_UNITS: usize = 8;
    pub const Z_UNITS: usize = 9;
    pub const X_LABEL: usize = 10;
    pub const Y_LABEL: usize = 11;

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.strings.get(slot).map(String::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.get(Self::LABEL)
    }

    pub fn path(&self) -> Option<&str> {
        self.get(Self::PATH)
    }

    /// Acquisition date and time as stored, e.g. `("04/22/16", "11:01:44")`.
    pub fn timestamp(&self) -> Option<(&str, &str)> {
        Some((self.get(Self::DATE)?, self.get(Self::TIME)?))
    }

    /// Physical units of the X, Y and Z axes.
    pub fn units(&self) -> Option<(&str, &str, &str)> {
        Some((self.get(Self::X_UNITS)?, self.get(Self::Y_UNITS)?, self.get(Self::Z_UNITS)?))
    }
}

/// PRM header (object id 15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrmHeader {
    /// 1 if the PRM payload is zlib compressed.
    pub compression: u32,
    pub original_size: u32,
    pub compressed_size: u32,
}

/// Thumbnail header (object id 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailHeader {
    pub width: u32,
    pub height: u32,
    pub format: u32,
}
