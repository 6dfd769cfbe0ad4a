//! Decoders for the object kinds with a fixed binary layout.
//!
//! Each function seeks to the object's own offset before reading, so siblings
//! can be decoded in any order. Decoders that own a child directory return the
//! raw entries; the reader turns them into tree nodes.

use std::io::{Read, Seek};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::{debug, trace};

use crate::sm4::format::directory;
use crate::sm4::types::error::Result;
use crate::sm4::types::models::*;
use crate::sm4::utils;

/// Page index header: `page_count, object_count, reserved[2]` followed by its directory.
pub fn read_page_index_header<R: Read + Seek>(
    file: &mut R,
    entry: &DirectoryEntry,
) -> Result<(PageIndexHeader, Vec<DirectoryEntry>)> {
    let record = utils::read_record_at(file, entry.offset as u64, 16, "page index header")?;
    let mut reader = record.as_slice();
    let header = PageIndexHeader {
        page_count: reader.read_u32::<LittleEndian>()?,
        object_count: reader.read_u32::<LittleEndian>()?,
        reserved: [
            reader.read_u32::<LittleEndian>()?,
            reader.read_u32::<LittleEndian>()?,
        ],
    };
    debug!(
        "Page index header: pages={}, objects={}",
        header.page_count, header.object_count
    );
    let children = directory::read_entries(file, header.object_count)?;
    Ok((header, children))
}

/// Page index array: `page_count` inline page records, each followed by its directory.
///
/// The returned pages have empty `children`; the caller fills them in once the
/// directory entries have been added to the tree.
pub fn read_pages<R: Read + Seek>(
    file: &mut R,
    entry: &DirectoryEntry,
    page_count: u32,
) -> Result<Vec<(Page, Vec<DirectoryEntry>)>> {
    file.seek(std::io::SeekFrom::Start(entry.offset as u64))?;
    let mut pages = Vec::new();
    for index in 0..page_count {
        let record = utils::read_record(file, Page::SIZE, "page record")?;
        let mut reader = record.as_slice();
        let mut page_id = [0u8; 16];
        reader.read_exact(&mut page_id)?;
        let page = Page {
            page_id,
            data_type: DataType::from(reader.read_u32::<LittleEndian>()?),
            source_type: SourceType::from(reader.read_u32::<LittleEndian>()?),
            object_count: reader.read_u32::<LittleEndian>()?,
            minor_version: reader.read_u32::<LittleEndian>()?,
            children: Vec::new(),
        };
        trace!(
            "Page {}: {}, {}, {} objects",
            index,
            page.data_type.name(),
            page.source_type.name(),
            page.object_count
        );
        let entries = directory::read_entries(file, page.object_count)?;
        pages.push((page, entries));
    }
    Ok(pages)
}

/// Page header: the 180-byte fixed record followed by its directory.
pub fn read_page_header<R: Read + Seek>(
    file: &mut R,
    entry: &DirectoryEntry,
) -> Result<(PageHeader, Vec<DirectoryEntry>)> {
    let record = utils::read_record_at(file, entry.offset as u64, PageHeader::SIZE, "page header")?;
    let header = parse_page_header(&record)?;
    debug!(
        "Page header: {}x{} pixels, {} strings, {} objects",
        header.x_size, header.y_size, header.string_count, header.object_count
    );
    let children = directory::read_entries(file, header.object_count)?;
    Ok((header, children))
}

fn parse_page_header(mut r: &[u8]) -> Result<PageHeader> {
    let field_size = r.read_u16::<LittleEndian>()?;
    let string_count = r.read_u16::<LittleEndian>()?;
    let page = PageKind::from(r.read_u32::<LittleEndian>()?);
    let data_sub_source = r.read_u32::<LittleEndian>()?;
    let line_type = r.read_u32::<LittleEndian>()?;
    let x_coord = r.read_i32::<LittleEndian>()?;
    let y_coord = r.read_i32::<LittleEndian>()?;
    let x_size = r.read_i32::<LittleEndian>()?;
    let y_size = r.read_i32::<LittleEndian>()?;
    let image_type = r.read_i32::<LittleEndian>()?;
    let scan_dir = ScanDirection::from(r.read_i32::<LittleEndian>()?);
    let group_id = r.read_i32::<LittleEndian>()?;
    let data_size = r.read_u32::<LittleEndian>()?;
    let min_z_value = r.read_i32::<LittleEndian>()?;
    let max_z_value = r.read_i32::<LittleEndian>()?;
    let mut floats = [0f32; 11];
    r.read_f32_into::<LittleEndian>(&mut floats)?;
    let [x_scale, y_scale, z_scale, xy_scale, x_offset, y_offset, z_offset, period, bias, current, angle] =
        floats;
    let color_info_count = r.read_i32::<LittleEndian>()?;
    let grid_x_size = r.read_i32::<LittleEndian>()?;
    let grid_y_size = r.read_i32::<LittleEndian>()?;
    let object_count = r.read_u32::<LittleEndian>()?;
    let mut reserved = [0u8; 64];
    r.read_exact(&mut reserved)?;

    Ok(PageHeader {
        field_size,
        string_count,
        page,
        data_sub_source,
        line_type,
        x_coord,
        y_coord,
        x_size,
        y_size,
        image_type,
        scan_dir,
        group_id,
        data_size,
        min_z_value,
        max_z_value,
        x_scale,
        y_scale,
        z_scale,
        xy_scale,
        x_offset,
        y_offset,
        z_offset,
        period,
        bias,
        current,
        angle,
        color_info_count,
        grid_x_size,
        grid_y_size,
        object_count,
        reserved,
    })
}

/// Page data: `size / 4` little-endian i32 samples for image pages.
///
/// Other data types are left undecoded and yield `None`.
pub fn read_page_data<R: Read + Seek>(
    file: &mut R,
    entry: &DirectoryEntry,
    data_type: Option<DataType>,
) -> Result<Option<Vec<i32>>> {
    if data_type != Some(DataType::Image) {
        debug!("Page data of type {:?} is not decoded", data_type);
        return Ok(None);
    }
    let count = entry.size as usize / 4;
    let record = utils::read_record_at(file, entry.offset as u64, count * 4, "page data")?;
    let mut samples = vec![0i32; count];
    LittleEndian::read_i32_into(&record, &mut samples);
    trace!("Page data: {} samples", count);
    Ok(Some(samples))
}

/// String data: `count` strings, each a u16 length in UTF-16 units followed by the text.
pub fn read_string_data<R: Read + Seek>(
    file: &mut R,
    entry: &DirectoryEntry,
    count: u16,
) -> Result<StringData> {
    file.seek(std::io::SeekFrom::Start(entry.offset as u64))?;
    let mut strings = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let prefix = utils::read_record(file, 2, "string length")?;
        let units = LittleEndian::read_u16(&prefix) as usize;
        let bytes = utils::read_record(file, units * 2, "string text")?;
        strings.push(utils::decode_utf16(&bytes));
    }
    trace!("String data: {:?}", strings);
    Ok(StringData { strings })
}

pub fn read_prm_header<R: Read + Seek>(file: &mut R, entry: &DirectoryEntry) -> Result<PrmHeader> {
    let [compression, original_size, compressed_size] = read_u32_triple(file, entry, "PRM header")?;
    Ok(PrmHeader {
        compression,
        original_size,
        compressed_size,
    })
}

pub fn read_thumbnail_header<R: Read + Seek>(
    file: &mut R,
    entry: &DirectoryEntry,
) -> Result<ThumbnailHeader> {
    let [width, height, format] = read_u32_triple(file, entry, "thumbnail header")?;
    Ok(ThumbnailHeader {
        width,
        height,
        format,
    })
}

fn read_u32_triple<R: Read + Seek>(
    file: &mut R,
    entry: &DirectoryEntry,
    context: &'static str,
) -> Result<[u32; 3]> {
    let record = utils::read_record_at(file, entry.offset as u64, 12, context)?;
    let mut values = [0u32; 3];
    LittleEndian::read_u32_into(&record, &mut values);
    Ok(values)
}

/// Exactly `size` raw bytes at `offset`.
pub fn read_opaque<R: Read + Seek>(file: &mut R, entry: &DirectoryEntry) -> Result<Vec<u8>> {
    utils::read_record_at(file, entry.offset as u64, entry.size as usize, "opaque object")
}
