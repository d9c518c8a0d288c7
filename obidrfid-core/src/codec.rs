//! Request builders and reply decoders for the supported commands
//!
//! Pure transformations: nothing here performs I/O, knows about the
//! connection state or logs. Failures come back as [`Error::InvalidArgument`]
//! (caller input) or [`Error::Decode`] (reader bytes).

use bytes::{BufMut, Bytes, BytesMut};

use obidrfid_types::{ConfigBlock, ReaderInfo, TransponderRecord};

use crate::codes::{INVENTORY_HEADER_LEN, READER_INFO_TYPE_OFFSET};
use crate::error::{Error, Result};

/// ISO host sub-command: inventory
pub const ISO_INVENTORY: u8 = 0x01;

/// Inventory mode byte (plain inventory, no extra flags)
pub const INVENTORY_MODE: u8 = 0x00;

/// Reader-info mode: general controller information
pub const READER_INFO_MODE: u8 = 0x00;

/// Build the 2-byte inventory request `[0x01, 0x00]`
pub fn encode_inventory_request() -> Bytes {
    Bytes::from_static(&[ISO_INVENTORY, INVENTORY_MODE])
}

/// Build the reader-info request
pub fn encode_reader_info_request() -> Bytes {
    Bytes::from_static(&[READER_INFO_MODE])
}

/// Build a read-configuration request for `block_index`
pub fn encode_read_config_request(block_index: u8) -> Bytes {
    Bytes::copy_from_slice(&[block_index])
}

/// Build a write-configuration request: block index followed by the 14 block bytes
pub fn encode_write_config_request(block_index: u8, block: &ConfigBlock) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + ConfigBlock::SIZE);
    buf.put_u8(block_index);
    buf.put_slice(block.as_bytes());
    buf.freeze()
}

/// Decode the tag records of a successful inventory reply
///
/// `length` is the reply length reported by the transport, not the buffer
/// capacity. Bytes `[0, 2)` are a header; bytes `[2, length)` hold
/// consecutive 20-byte records.
///
/// A reply of 2 bytes or less carries no records and yields an empty list.
///
/// # Errors
///
/// Returns [`Error::Decode`] if:
/// - `length` exceeds the buffer
/// - the record area is not a whole number of records
/// - any field of any record is not valid UTF-8 (the whole batch is rejected)
pub fn decode_inventory_response(buffer: &[u8], length: usize) -> Result<Vec<TransponderRecord>> {
    if length > buffer.len() {
        return Err(Error::Decode(format!(
            "reported length {} exceeds buffer of {} bytes",
            length,
            buffer.len()
        )));
    }

    if length <= INVENTORY_HEADER_LEN {
        return Ok(Vec::new());
    }

    let body = &buffer[INVENTORY_HEADER_LEN..length];
    let trailing = body.len() % TransponderRecord::SIZE;
    if trailing != 0 {
        return Err(Error::Decode(format!(
            "inventory body of {} bytes leaves a partial record of {} bytes",
            body.len(),
            trailing
        )));
    }

    body.chunks_exact(TransponderRecord::SIZE)
        .enumerate()
        .map(|(index, chunk)| decode_transponder_record(chunk, index))
        .collect()
}

/// Decode one 20-byte record; `index` is only used in error messages
pub fn decode_transponder_record(chunk: &[u8], index: usize) -> Result<TransponderRecord> {
    if chunk.len() != TransponderRecord::SIZE {
        return Err(Error::Decode(format!(
            "record {} is {} bytes, expected {}",
            index,
            chunk.len(),
            TransponderRecord::SIZE
        )));
    }

    let (tr_type, rest) = chunk.split_at(TransponderRecord::TR_TYPE_LEN);
    let (dsfid, iid) = rest.split_at(TransponderRecord::DSFID_LEN);

    Ok(TransponderRecord {
        tr_type: text_field(tr_type, index, "tr_type")?,
        dsfid: text_field(dsfid, index, "dsfid")?,
        iid: text_field(iid, index, "iid")?,
    })
}

fn text_field(bytes: &[u8], index: usize, field: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        Error::Decode(format!(
            "record {} field {} is not valid UTF-8: {}",
            index, field, e
        ))
    })
}

/// Decode the reader-info buffer
///
/// Only the descriptive byte at offset 4 is interpreted; the whole buffer is
/// kept in [`ReaderInfo::raw`].
pub fn decode_reader_info(buffer: &[u8]) -> Result<ReaderInfo> {
    let reader_type = buffer.get(READER_INFO_TYPE_OFFSET).copied().ok_or_else(|| {
        Error::Decode(format!(
            "reader info of {} bytes has no byte at offset {}",
            buffer.len(),
            READER_INFO_TYPE_OFFSET
        ))
    })?;

    Ok(ReaderInfo::new(reader_type, Bytes::copy_from_slice(buffer)))
}

/// Decode a read-configuration reply into a [`ConfigBlock`]
///
/// # Errors
///
/// Returns [`Error::Decode`] unless exactly 14 bytes were reported.
pub fn decode_config_block(buffer: &[u8], length: usize) -> Result<ConfigBlock> {
    if length != ConfigBlock::SIZE || buffer.len() < length {
        return Err(Error::Decode(format!(
            "configuration block must be {} bytes, reader sent {} (buffer {})",
            ConfigBlock::SIZE,
            length,
            buffer.len()
        )));
    }

    ConfigBlock::from_slice(&buffer[..length])
        .map_err(|e| Error::Decode(e.to_string()))
}

/// Write `ip_octets` into offsets 0..4 of a copy of `block`
///
/// Bytes 4..14 are carried over unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `block` is not 14 bytes, if
/// `ip_octets` does not hold exactly 4 values, or if any value exceeds 255.
///
/// # Examples
///
/// ```
/// use obidrfid_core::codec;
///
/// let block = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
/// let updated = codec::apply_ip_to_config_block(&block, &[192, 168, 1, 5]).unwrap();
/// assert_eq!(&updated.as_bytes()[..4], &[192, 168, 1, 5]);
/// ```
pub fn apply_ip_to_config_block(block: &[u8], ip_octets: &[u32]) -> Result<ConfigBlock> {
    let mut block = ConfigBlock::from_slice(block)?;

    let octets: [u32; ConfigBlock::IP_LEN] = ip_octets.try_into().map_err(|_| {
        Error::InvalidArgument(format!(
            "expected {} IP octets, got {}",
            ConfigBlock::IP_LEN,
            ip_octets.len()
        ))
    })?;

    let mut ip = [0u8; ConfigBlock::IP_LEN];
    for (slot, &value) in ip.iter_mut().zip(octets.iter()) {
        *slot = u8::try_from(value).map_err(|_| {
            Error::InvalidArgument(format!("IP octet {} is out of range 0-255", value))
        })?;
    }

    block.set_ip(ip.into());
    Ok(block)
}
